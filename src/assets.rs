use bevy::{audio::AudioSource, prelude::*};
use bevy_asset_loader::prelude::*;

#[derive(AssetCollection)]
pub struct GameAssets {
    #[asset(path = "RobotoMedium-Owv4.ttf")]
    pub font: Handle<Font>,

    #[asset(path = "snake_head.png")]
    pub snake_head: Handle<Image>,
    #[asset(path = "snake_head_hungry.png")]
    pub snake_head_hungry: Handle<Image>,
    #[asset(path = "snake_body.png")]
    pub snake_body: Handle<Image>,
    #[asset(path = "snake_tail.png")]
    pub snake_tail: Handle<Image>,
    #[asset(path = "food.png")]
    pub food: Handle<Image>,
    #[asset(path = "pause.png")]
    pub pause: Handle<Image>,

    #[asset(path = "sounds/background.ogg")]
    pub music: Handle<AudioSource>,
    #[asset(path = "sounds/eat.ogg")]
    pub eat: Handle<AudioSource>,
    #[asset(path = "sounds/hiss.ogg")]
    pub hiss: Handle<AudioSource>,
}
