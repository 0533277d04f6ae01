use std::time::{Duration, Instant};

use bevy::{
    audio::{AudioSink, PlaybackSettings},
    prelude::*,
};
use bevy_asset_loader::prelude::*;

use assets::GameAssets;
use components::{HudLabel, MenuItem, Screen};
use configuration::Configuration;
use draw_plugin::DrawPlugin;
use resources::MusicController;
use snake::{GameState, SnakeGame};
use snake_plugin::{
    events::{FoodAteEvent, GameOverEvent, ProximityAlertEvent},
    SnakePlugin,
};

mod assets;
pub mod configuration;
mod draw_plugin;
pub mod snake;
pub mod snake_plugin;

pub use snake_plugin::resources::SimulationClock;

const BACKGROUND: Color = Color::rgb(180. / 255., 220. / 255., 180. / 255.);
const TEXT_COLOR: Color = Color::BLACK;
const HIGHLIGHT_COLOR: Color = Color::rgb(200. / 255., 0., 0.);

const OVERLAY_Z: f32 = 5.;
const TEXT_Z: f32 = 10.;

/// Window level plugin: menu, HUD, game over and pause screens, audio and
/// frame pacing on top of the snake plugins.
///
/// Expects `Configuration`, `SnakeGame` and `SimulationClock` resources.
pub struct MainPlugin;
impl Plugin for MainPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(BACKGROUND))
            .init_collection::<GameAssets>()
            .add_plugin(SnakePlugin)
            .add_plugin(DrawPlugin)
            .add_startup_system(setup)
            .add_startup_system(start_music)
            .add_system(show_screens.after("play"))
            .add_system(update_menu.after("actions"))
            .add_system(update_labels.after("play"))
            .add_system(log_game_over.after("play"))
            .add_system(play_sounds.after("play"))
            .add_system(update_music_volume.after("actions"))
            .add_system_to_stage(CoreStage::Last, limit_frame_rate);
    }
}

fn setup(mut commands: Commands, assets: Res<GameAssets>, configuration: Res<Configuration>) {
    commands.spawn_bundle(Camera2dBundle::default());

    let width = configuration.width as f32;
    let height = configuration.height as f32;
    // screen pixels are measured from the top-left corner, y downwards
    let at = |x: f32, y: f32| Transform::from_xyz(x - width / 2., height / 2. - y, TEXT_Z);

    let style = |font_size: f32, color: Color| TextStyle {
        font: assets.font.clone(),
        font_size,
        color,
    };

    let mut text = |value: String,
                    style: TextStyle,
                    alignment: TextAlignment,
                    transform: Transform,
                    screen: Screen| {
        commands
            .spawn_bundle(Text2dBundle {
                text: Text::from_section(value, style).with_alignment(alignment),
                transform,
                ..default()
            })
            .insert(screen)
            .id()
    };

    // menu
    text(
        "SNAKE".to_string(),
        style(72., TEXT_COLOR),
        TextAlignment::CENTER,
        at(width / 2., 150.),
        Screen::Menu,
    );
    let items: Vec<Entity> = snake::Difficulty::ALL
        .iter()
        .enumerate()
        .map(|(i, difficulty)| {
            text(
                difficulty.to_string(),
                style(40., TEXT_COLOR),
                TextAlignment::CENTER,
                at(width / 2., 300. + i as f32 * 50.),
                Screen::Menu,
            )
        })
        .collect();
    text(
        "↑ ↓ Enter".to_string(),
        style(24., TEXT_COLOR),
        TextAlignment::CENTER,
        at(width / 2., 500.),
        Screen::Menu,
    );

    // HUD
    let score = text(
        String::new(),
        style(24., TEXT_COLOR),
        TextAlignment::TOP_LEFT,
        at(10., 10.),
        Screen::Hud,
    );
    let mute = text(
        String::new(),
        style(24., TEXT_COLOR),
        TextAlignment::TOP_LEFT,
        at(width - 130., 10.),
        Screen::Hud,
    );
    let pause = text(
        String::new(),
        style(24., TEXT_COLOR),
        TextAlignment::TOP_LEFT,
        at(width - 130., 40.),
        Screen::Hud,
    );

    // game over
    text(
        "GAME OVER".to_string(),
        style(72., HIGHLIGHT_COLOR),
        TextAlignment::CENTER,
        at(width / 2., 260.),
        Screen::GameOver,
    );
    text(
        "R = Menu | ESC = Quit".to_string(),
        style(24., TEXT_COLOR),
        TextAlignment::CENTER,
        at(width / 2., 330.),
        Screen::GameOver,
    );
    let high_score = text(
        String::new(),
        style(24., TEXT_COLOR),
        TextAlignment::CENTER,
        at(width / 2., 380.),
        Screen::GameOver,
    );

    for (i, entity) in items.into_iter().enumerate() {
        commands.entity(entity).insert(MenuItem(i));
    }
    commands.entity(score).insert(HudLabel::Score);
    commands.entity(mute).insert(HudLabel::Mute);
    commands.entity(pause).insert(HudLabel::Pause);
    commands.entity(high_score).insert(HudLabel::HighScore);

    // pause overlay
    commands
        .spawn_bundle(SpriteBundle {
            sprite: Sprite {
                color: Color::rgba(0.0, 0.0, 0.0, 120. / 255.),
                custom_size: Some(Vec2::new(width, height)),
                ..default()
            },
            transform: Transform::from_xyz(0., 0., OVERLAY_Z),
            ..default()
        })
        .insert(Screen::Pause);
    commands
        .spawn_bundle(SpriteBundle {
            sprite: Sprite {
                custom_size: Some(Vec2::new(300., 300.)),
                ..default()
            },
            texture: assets.pause.clone(),
            transform: Transform::from_xyz(0., 0., OVERLAY_Z + 1.),
            ..default()
        })
        .insert(Screen::Pause);
}

fn show_screens(snake_game: Res<SnakeGame>, mut screens: Query<(&Screen, &mut Visibility)>) {
    let state = snake_game.state();
    for (screen, mut visibility) in screens.iter_mut() {
        visibility.is_visible = match screen {
            Screen::Menu => state == GameState::Menu,
            Screen::Hud => state != GameState::Menu,
            Screen::GameOver => state == GameState::GameOver,
            Screen::Pause => state == GameState::Playing && snake_game.is_paused(),
        };
    }
}

fn update_menu(snake_game: Res<SnakeGame>, mut items: Query<(&MenuItem, &mut Text)>) {
    let selected = snake_game.selected_menu_index();
    for (item, mut text) in items.iter_mut() {
        text.sections[0].style.color = if item.0 == selected {
            HIGHLIGHT_COLOR
        } else {
            TEXT_COLOR
        };
    }
}

fn update_labels(snake_game: Res<SnakeGame>, mut labels: Query<(&HudLabel, &mut Text)>) {
    for (label, mut text) in labels.iter_mut() {
        text.sections[0].value = label.render(&snake_game);
    }
}

fn log_game_over(
    mut game_over_event_reader: EventReader<GameOverEvent>,
    snake_game: Res<SnakeGame>,
) {
    for event in game_over_event_reader.iter() {
        warn!(
            "Game over! {} with score {} on {}",
            event.error,
            snake_game.score(),
            snake_game.difficulty()
        );
    }
}

fn audible(snake_game: &SnakeGame) -> f32 {
    if snake_game.is_muted() || snake_game.is_paused() {
        0.
    } else {
        1.
    }
}

fn play_sounds(
    audio: Res<Audio>,
    assets: Res<GameAssets>,
    configuration: Res<Configuration>,
    snake_game: Res<SnakeGame>,
    mut food_ate_event_reader: EventReader<FoodAteEvent>,
    mut alert_event_reader: EventReader<ProximityAlertEvent>,
) {
    let volume = audible(&snake_game);

    if food_ate_event_reader.iter().count() > 0 {
        audio.play_with_settings(
            assets.eat.clone(),
            PlaybackSettings::ONCE.with_volume(configuration.eat_volume * volume),
        );
    }
    if alert_event_reader.iter().count() > 0 {
        audio.play_with_settings(
            assets.hiss.clone(),
            PlaybackSettings::ONCE.with_volume(configuration.alert_volume * volume),
        );
    }
}

fn start_music(
    mut commands: Commands,
    audio: Res<Audio>,
    assets: Res<GameAssets>,
    configuration: Res<Configuration>,
    audio_sinks: Res<Assets<AudioSink>>,
) {
    let sink = audio.play_with_settings(
        assets.music.clone(),
        PlaybackSettings::LOOP.with_volume(configuration.music_volume),
    );
    commands.insert_resource(MusicController(audio_sinks.get_handle(sink)));
}

fn update_music_volume(
    snake_game: Res<SnakeGame>,
    configuration: Res<Configuration>,
    audio_sinks: Res<Assets<AudioSink>>,
    music_controller: Option<Res<MusicController>>,
) {
    let music_controller = match music_controller {
        Some(controller) => controller,
        None => return,
    };
    if let Some(sink) = audio_sinks.get(&music_controller.0) {
        sink.set_volume(configuration.music_volume * audible(&snake_game));
    }
}

/// Sleeps away what is left of the frame budget. The only blocking point.
fn limit_frame_rate(configuration: Res<Configuration>, mut last_frame: Local<Option<Instant>>) {
    let budget = Duration::from_secs_f64(1. / configuration.frame_rate);
    if let Some(last) = *last_frame {
        let elapsed = last.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        }
    }
    *last_frame = Some(Instant::now());
}

mod components {
    use bevy::prelude::Component;

    use crate::snake::SnakeGame;

    #[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Screen {
        Menu,
        Hud,
        GameOver,
        Pause,
    }

    #[derive(Component)]
    pub struct MenuItem(pub usize);

    #[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
    pub enum HudLabel {
        Score,
        Mute,
        Pause,
        HighScore,
    }

    impl HudLabel {
        pub fn render(&self, snake_game: &SnakeGame) -> String {
            match self {
                HudLabel::Score => format!("Score: {}", snake_game.score()),
                HudLabel::Mute if snake_game.is_muted() => "[M] Unmute".to_string(),
                HudLabel::Mute => "[M] Mute".to_string(),
                HudLabel::Pause if snake_game.is_paused() => "[P] Resume".to_string(),
                HudLabel::Pause => "[P] Pause".to_string(),
                HudLabel::HighScore => format!(
                    "High Score ({}): {}",
                    snake_game.difficulty(),
                    snake_game.high_score()
                ),
            }
        }
    }
}

mod resources {
    use bevy::{asset::Handle, audio::AudioSink};

    pub struct MusicController(pub Handle<AudioSink>);
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use bevy::{
        app::AppExit,
        input::{ButtonState, InputPlugin},
        prelude::*,
    };

    use crate::{
        components::HudLabel,
        configuration::Configuration,
        snake::{
            CellSampler, Difficulty, GameState, Grid, HighScoreStore, MemoryHighScoreStore,
            Position, SnakeGame,
        },
        snake_plugin::{
            events::{FoodAteEvent, ProximityAlertEvent},
            SnakePlugin,
        },
        SimulationClock,
    };

    use super::audible;

    struct Fixed(VecDeque<Position>);

    impl CellSampler for Fixed {
        fn sample(&mut self, grid: &Grid) -> Position {
            self.0.pop_front().unwrap_or_else(|| Position::new(0, grid.rows() - 1))
        }
    }

    #[test]
    fn test_e2e() {
        let store = MemoryHighScoreStore::default();
        let mut app = create_app(store.clone(), vec![Position::new(16, 13)]);

        press_keyboard_key(&mut app, KeyCode::Down);
        app.update();
        press_keyboard_key(&mut app, KeyCode::Return);
        app.update();

        let game = app.world.resource::<SnakeGame>();
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.difficulty(), Difficulty::Medium);
        assert_eq!(game.snake().head(), Position::new(16, 12));

        // Nothing moves before the delay is over
        advance(&mut app, 100);
        assert_eq!(
            app.world.resource::<SnakeGame>().snake().head(),
            Position::new(16, 12)
        );

        advance(&mut app, 80);
        let game = app.world.resource::<SnakeGame>();
        assert_eq!(game.snake().head(), Position::new(16, 13));
        assert_eq!(game.snake().len(), 4);
        assert_eq!(game.score(), 1);
        assert_eq!(HudLabel::Score.render(game), "Score: 1");
        assert_eq!(count_events::<FoodAteEvent>(&mut app), 1);

        info!("steer into the left wall");

        press_keyboard_key(&mut app, KeyCode::Left);
        app.update();
        for _ in 0..17 {
            advance(&mut app, 200);
        }

        let game = app.world.resource::<SnakeGame>();
        assert_eq!(game.state(), GameState::GameOver);
        assert_eq!(game.high_score(), 1);
        assert_eq!(store.load().unwrap().get(Difficulty::Medium), 1);

        press_keyboard_key(&mut app, KeyCode::R);
        app.update();
        assert_eq!(
            app.world.resource::<SnakeGame>().state(),
            GameState::Menu
        );
    }

    #[test]
    fn test_escape_quits_without_saving() {
        let store = MemoryHighScoreStore::default();
        let mut app = create_app(store.clone(), vec![Position::new(16, 13)]);

        press_keyboard_key(&mut app, KeyCode::Return);
        app.update();
        advance(&mut app, 220);
        assert_eq!(app.world.resource::<SnakeGame>().score(), 1);

        press_keyboard_key(&mut app, KeyCode::Escape);
        app.update();

        assert_eq!(count_events::<AppExit>(&mut app), 1);
        assert_eq!(store.read().unwrap(), None);
    }

    #[test]
    fn test_pause_holds_the_snake() {
        let mut app = create_app(MemoryHighScoreStore::default(), vec![]);

        press_keyboard_key(&mut app, KeyCode::Return);
        app.update();
        press_keyboard_key(&mut app, KeyCode::P);
        app.update();
        advance(&mut app, 1_000);

        let game = app.world.resource::<SnakeGame>();
        assert!(game.is_paused());
        assert_eq!(game.snake().head(), Position::new(16, 12));
        assert_eq!(HudLabel::Pause.render(game), "[P] Resume");
    }

    #[test]
    fn test_food_next_to_the_head_hisses_at_start() {
        let mut app = create_app(MemoryHighScoreStore::default(), vec![Position::new(16, 14)]);

        press_keyboard_key(&mut app, KeyCode::Return);
        app.update();

        assert!(app.world.resource::<SnakeGame>().near_food());
        assert_eq!(count_events::<ProximityAlertEvent>(&mut app), 1);
    }

    #[test]
    fn test_mute_and_pause_silence_audio() {
        let mut app = create_app(MemoryHighScoreStore::default(), vec![]);

        let game = app.world.resource::<SnakeGame>();
        assert_eq!(audible(game), 1.);
        assert_eq!(HudLabel::Mute.render(game), "[M] Mute");

        press_keyboard_key(&mut app, KeyCode::M);
        app.update();
        let game = app.world.resource::<SnakeGame>();
        assert!(game.is_muted());
        assert_eq!(audible(game), 0.);
        assert_eq!(HudLabel::Mute.render(game), "[M] Unmute");

        press_again(&mut app, KeyCode::M);
        app.update();
        press_keyboard_key(&mut app, KeyCode::Return);
        app.update();
        press_keyboard_key(&mut app, KeyCode::P);
        app.update();
        let game = app.world.resource::<SnakeGame>();
        assert!(!game.is_muted() && game.is_paused());
        assert_eq!(audible(game), 0.);
        assert_eq!(HudLabel::Mute.render(game), "[M] Mute");

        press_again(&mut app, KeyCode::P);
        app.update();
        assert_eq!(audible(app.world.resource::<SnakeGame>()), 1.);
    }

    fn advance(app: &mut App, millis: u64) {
        app.world.resource_mut::<SimulationClock>().advance(millis);
        app.update();
    }

    fn count_events<T: Send + Sync + 'static>(app: &mut App) -> usize {
        let events = app.world.resource::<Events<T>>();
        let mut reader = events.get_reader();
        reader.iter(events).count()
    }

    pub fn press_keyboard_key(app: &mut App, code: KeyCode) {
        send_keyboard_key(app, code, ButtonState::Pressed);
    }

    /// A held key is not pressed again until it is released.
    fn press_again(app: &mut App, code: KeyCode) {
        send_keyboard_key(app, code, ButtonState::Released);
        send_keyboard_key(app, code, ButtonState::Pressed);
    }

    fn send_keyboard_key(app: &mut App, code: KeyCode, state: ButtonState) {
        use bevy::input::keyboard::KeyboardInput;

        let world = &mut app.world;
        let mut keyboard_input = world.get_resource_mut::<Events<KeyboardInput>>().unwrap();
        keyboard_input.send(KeyboardInput {
            scan_code: 0,
            key_code: Some(code),
            state,
        });
    }

    fn init_logging() {
        use tracing_log::LogTracer;
        use tracing_subscriber::{prelude::*, registry::Registry, EnvFilter};

        if LogTracer::init().is_ok() {
            let filter_layer = EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("OFF,snake_arcade=INFO"))
                .unwrap();
            let subscriber = Registry::default().with(filter_layer);
            let fmt_layer = tracing_subscriber::fmt::Layer::default();
            let subscriber = subscriber.with(fmt_layer);
            tracing::subscriber::set_global_default(subscriber).unwrap();
        }
    }

    pub fn create_app(store: MemoryHighScoreStore, foods: Vec<Position>) -> App {
        init_logging();

        let configuration = Configuration::default();
        let snake_game = SnakeGame::new(
            configuration.grid().unwrap(),
            Box::new(store),
            Box::new(Fixed(foods.into())),
        )
        .with_alert_threshold(configuration.alert_threshold);

        let mut app = App::new();

        app.add_plugins(MinimalPlugins);
        app.add_plugin(InputPlugin::default());

        app.insert_resource(configuration)
            .insert_resource(snake_game)
            .insert_resource(SimulationClock::manual(0));

        app.add_plugin(SnakePlugin);

        app
    }
}
