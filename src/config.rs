//! Scene configuration.
//!
//! [`SceneConfig`] carries the defaults a scene hands to the objects it
//! creates. Everything can be overridden per object; the config only decides
//! what you get when you don't.

use cgmath::{Deg, Rad};

use crate::data_structures::color::Color;

/// Initial values for cameras created by a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraDefaults {
    pub hfov: Rad<f64>,
    pub near: f64,
    pub far: f64,
    pub anti_aliasing: u32,
    pub image_width: u32,
    pub image_height: u32,
    pub background: Color,
}

impl Default for CameraDefaults {
    fn default() -> Self {
        Self {
            hfov: Deg(90.0).into(),
            near: 0.01,
            far: 1000.0,
            anti_aliasing: 0,
            image_width: 320,
            image_height: 240,
            background: Color::BLACK,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub name: String,
    pub camera: CameraDefaults,
    /// Colour of wire boxes created without an explicit material.
    pub line_colour: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: "scene".to_string(),
            camera: CameraDefaults::default(),
            line_colour: Color::WHITE,
        }
    }
}

impl SceneConfig {
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_camera_defaults(mut self, camera: CameraDefaults) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_line_colour(mut self, colour: Color) -> Self {
        self.line_colour = colour;
        self
    }
}
