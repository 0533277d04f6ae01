use bevy::{app::AppExit, prelude::*};

use crate::snake::{Control, GameState, InputAction, Millis, SnakeGame, TickOutcome};

use self::{
    events::{FoodAteEvent, GameOverEvent, ProximityAlertEvent},
    resources::SimulationClock,
};

/// Game rules as bevy systems: keyboard to actions, actions to the state
/// machine, and one simulation step per frame at most.
///
/// Expects a `SnakeGame` and a `SimulationClock` resource to be inserted.
pub struct SnakePlugin;

impl Plugin for SnakePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<InputAction>()
            .add_event::<GameOverEvent>()
            .add_event::<FoodAteEvent>()
            .add_event::<ProximityAlertEvent>()
            .add_system(update_clock.label("clock"))
            .add_system(read_keyboard.label("keyboard"))
            .add_system(apply_actions.label("actions").after("keyboard").after("clock"))
            .add_system(play.label("play").after("actions"));
    }
}

fn update_clock(time: Res<Time>, mut clock: ResMut<SimulationClock>) {
    clock.follow(time.time_since_startup().as_millis() as Millis);
}

/// Maps a pressed key to the action it means in the current state.
pub fn action_for_key(state: GameState, key: KeyCode) -> Option<InputAction> {
    match (state, key) {
        (_, KeyCode::Escape) => Some(InputAction::Quit),
        (_, KeyCode::P) => Some(InputAction::TogglePause),
        (_, KeyCode::M) => Some(InputAction::ToggleMute),
        (GameState::Menu, KeyCode::Up) => Some(InputAction::CycleDifficultyUp),
        (GameState::Menu, KeyCode::Down) => Some(InputAction::CycleDifficultyDown),
        (GameState::Menu, KeyCode::Return) => Some(InputAction::ConfirmSelect),
        (GameState::Playing, KeyCode::Up) => Some(InputAction::MoveUp),
        (GameState::Playing, KeyCode::Down) => Some(InputAction::MoveDown),
        (GameState::Playing, KeyCode::Left) => Some(InputAction::MoveLeft),
        (GameState::Playing, KeyCode::Right) => Some(InputAction::MoveRight),
        (GameState::GameOver, KeyCode::R) => Some(InputAction::ReturnToMenu),
        _ => None,
    }
}

fn read_keyboard(
    keyboard: Res<Input<KeyCode>>,
    snake_game: Res<SnakeGame>,
    mut action_writer: EventWriter<InputAction>,
) {
    let state = snake_game.state();
    for key in keyboard.get_just_pressed() {
        if let Some(action) = action_for_key(state, *key) {
            action_writer.send(action);
        }
    }
}

fn apply_actions(
    clock: Res<SimulationClock>,
    mut actions: EventReader<InputAction>,
    mut snake_game: ResMut<SnakeGame>,
    mut alert_event_writer: EventWriter<ProximityAlertEvent>,
    mut exit: EventWriter<AppExit>,
) {
    for action in actions.iter() {
        if snake_game.handle(*action, clock.now()) == Control::Quit {
            exit.send(AppExit);
            return;
        }

        // a fresh game may put the food right next to the head
        if snake_game.take_alert() {
            alert_event_writer.send(ProximityAlertEvent);
        }
    }
}

fn play(
    clock: Res<SimulationClock>,
    mut snake_game: ResMut<SnakeGame>,
    mut food_ate_event_writer: EventWriter<FoodAteEvent>,
    mut alert_event_writer: EventWriter<ProximityAlertEvent>,
    mut game_over_event_writer: EventWriter<GameOverEvent>,
) {
    match snake_game.play(clock.now()) {
        TickOutcome::Waiting => {}
        TickOutcome::Moved(snapshot) => {
            debug!("tick! head at {:?}", snapshot.snake[0]);

            if snapshot.food_ate {
                food_ate_event_writer.send(FoodAteEvent);
            }
            if snapshot.alert_triggered {
                alert_event_writer.send(ProximityAlertEvent);
            }
        }
        TickOutcome::Over(error) => {
            game_over_event_writer.send(GameOverEvent { error });
        }
    }
}

pub mod resources {
    use crate::snake::Millis;

    /// Milliseconds fed to the game. Follows bevy's `Time` unless manual.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SimulationClock {
        now: Millis,
        manual: bool,
    }

    impl SimulationClock {
        pub fn realtime() -> Self {
            Self {
                now: 0,
                manual: false,
            }
        }

        pub fn manual(start: Millis) -> Self {
            Self {
                now: start,
                manual: true,
            }
        }

        pub fn now(&self) -> Millis {
            self.now
        }

        pub fn advance(&mut self, elapsed: Millis) {
            self.now += elapsed;
        }

        pub(super) fn follow(&mut self, since_startup: Millis) {
            if !self.manual {
                self.now = since_startup;
            }
        }
    }
}

pub mod events {
    use crate::snake::SnakeError;

    pub struct GameOverEvent {
        pub error: SnakeError,
    }
    pub struct FoodAteEvent;
    pub struct ProximityAlertEvent;
}

#[cfg(test)]
mod tests {
    use bevy::prelude::KeyCode;

    use super::{action_for_key, resources::SimulationClock};
    use crate::snake::{GameState, InputAction};

    #[test]
    fn test_arrows_depend_on_state() {
        assert_eq!(
            action_for_key(GameState::Menu, KeyCode::Up),
            Some(InputAction::CycleDifficultyUp)
        );
        assert_eq!(
            action_for_key(GameState::Playing, KeyCode::Up),
            Some(InputAction::MoveUp)
        );
        assert_eq!(action_for_key(GameState::GameOver, KeyCode::Up), None);
        assert_eq!(action_for_key(GameState::Menu, KeyCode::Left), None);
    }

    #[test]
    fn test_global_keys() {
        for state in [GameState::Menu, GameState::Playing, GameState::GameOver] {
            assert_eq!(action_for_key(state, KeyCode::Escape), Some(InputAction::Quit));
            assert_eq!(
                action_for_key(state, KeyCode::P),
                Some(InputAction::TogglePause)
            );
            assert_eq!(
                action_for_key(state, KeyCode::M),
                Some(InputAction::ToggleMute)
            );
        }
        assert_eq!(
            action_for_key(GameState::GameOver, KeyCode::R),
            Some(InputAction::ReturnToMenu)
        );
        assert_eq!(action_for_key(GameState::Playing, KeyCode::R), None);
    }

    #[test]
    fn test_manual_clock_ignores_real_time() {
        let mut clock = SimulationClock::manual(10);
        clock.follow(5_000);
        assert_eq!(clock.now(), 10);
        clock.advance(15);
        assert_eq!(clock.now(), 25);

        let mut clock = SimulationClock::realtime();
        clock.follow(5_000);
        assert_eq!(clock.now(), 5_000);
    }
}
