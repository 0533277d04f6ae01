use bevy::{log::LogSettings, prelude::*, window::PresentMode};

use snake_arcade::{
    configuration::{Configuration, ConfigurationError},
    MainPlugin, SimulationClock,
};

fn main() -> Result<(), ConfigurationError> {
    let configuration = Configuration::default();
    let snake_game = configuration.build_game()?;
    let (width, height) = snake_game.grid().dimension();

    App::new()
        .insert_resource(WindowDescriptor {
            title: "Snake".to_string(),
            width: width as f32,
            height: height as f32,
            resizable: false,
            // frames are paced by the limiter alone
            present_mode: PresentMode::Immediate,
            ..default()
        })
        .insert_resource(LogSettings {
            filter: "wgpu=error,bevy_render=warn,snake_arcade=info".to_string(),
            ..default()
        })
        .insert_resource(configuration)
        .insert_resource(snake_game)
        .insert_resource(SimulationClock::realtime())
        .add_plugins(DefaultPlugins)
        .add_plugin(MainPlugin)
        .run();

    Ok(())
}
