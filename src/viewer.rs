//! Window presentation of a finished frame

use macroquad::prelude::{
    clear_background, draw_texture_ex, is_key_pressed, next_frame, screen_height, screen_width,
    vec2, Conf, DrawTextureParams, FilterMode, KeyCode, Texture2D, BLACK, WHITE,
};

use yasr::rasterizer::Framebuffer;
use yasr::VERSION;

pub fn window_conf(width: usize, height: usize) -> Conf {
    Conf {
        window_title: format!("Yet Another Software Rasterizer v{}", VERSION),
        window_width: width as i32,
        window_height: height as i32,
        window_resizable: false,
        ..Default::default()
    }
}

/// Show `fb` stretched to the window until Escape or close
pub async fn run(fb: Framebuffer) {
    let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.to_rgba8());
    texture.set_filter(FilterMode::Nearest);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        clear_background(BLACK);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        next_frame().await;
    }
}
