use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use crate::{
    assets::GameAssets,
    configuration::Configuration,
    snake::{Direction, GameState, Position, SnakeGame},
    snake_plugin::{events::FoodAteEvent, resources::SimulationClock},
};

use self::{components::*, resources::*};

const FOOD_Z: f32 = 0.;
// Snake can overlap with foods,
// so should be bigger
const SNAKE_Z: f32 = 1.;
const HEAD_Z: f32 = 2.;

/// Draws the board: snake sprites, food and the camera shake after eating.
pub struct DrawPlugin;

impl Plugin for DrawPlugin {
    fn build(&self, app: &mut App) {
        let grid = *app.world.resource::<SnakeGame>().grid();
        let cell_size = grid.unit() as f32;
        let (width, height) = grid.dimension();

        let draw_configuration = DrawConfigurationResource {
            cell_size,
            half_cell: cell_size / 2.,
            origin: (-(width as f32) / 2., height as f32 / 2.),
        };

        app.insert_resource(draw_configuration)
            .insert_resource(ShakeResource::default())
            .add_startup_system(draw_board)
            .add_system(update_snake_head.after("play"))
            .add_system(update_snake_body.after("play"))
            .add_system(update_food.after("play"))
            .add_system(shake_camera.after("play"));
    }
}

fn draw_board(
    mut commands: Commands,
    assets: Res<GameAssets>,
    draw_configuration: Res<DrawConfigurationResource>,
) {
    let mut food = sprite(assets.food.clone(), &draw_configuration);
    food.transform.translation.z = FOOD_Z;
    food.visibility.is_visible = false;
    commands.spawn_bundle(food).insert(FoodComponent);

    let mut head = sprite(assets.snake_head.clone(), &draw_configuration);
    head.transform.translation.z = HEAD_Z;
    head.visibility.is_visible = false;
    commands.spawn_bundle(head).insert(HeadSnakeComponent);
}

fn on_board(snake_game: &SnakeGame) -> bool {
    snake_game.state() != GameState::Menu
}

fn update_snake_head(
    snake_game: Res<SnakeGame>,
    assets: Res<GameAssets>,
    draw_configuration: Res<DrawConfigurationResource>,
    mut head_snake_query: Query<
        (&mut Transform, &mut Handle<Image>, &mut Visibility),
        With<HeadSnakeComponent>,
    >,
) {
    let (mut transform, mut texture, mut visibility) = match head_snake_query.get_single_mut() {
        Ok(head) => head,
        Err(_) => return,
    };

    visibility.is_visible = on_board(&snake_game);
    if !visibility.is_visible {
        return;
    }

    *texture = if snake_game.near_food() {
        assets.snake_head_hungry.clone()
    } else {
        assets.snake_head.clone()
    };

    move_to(&mut transform, &snake_game.snake().head(), &draw_configuration);
    transform.rotation = Quat::from_rotation_z(head_angle(snake_game.heading()));
}

fn update_snake_body(
    mut commands: Commands,
    snake_game: Res<SnakeGame>,
    assets: Res<GameAssets>,
    draw_configuration: Res<DrawConfigurationResource>,
    mut body_snake_query: Query<
        (Entity, &mut Transform, &mut Handle<Image>),
        With<BodySnakeComponent>,
    >,
) {
    let mut bodies = body_snake_query.iter_mut();

    if on_board(&snake_game) {
        let snake = snake_game.snake();
        let tail_index = snake.len() - 1;
        let mut heading = snake_game.heading();

        for (index, position) in snake.segments().enumerate().skip(1) {
            // a just grown piece sits on its predecessor, keep that one's heading
            heading = snake.segment_heading(index).unwrap_or(heading);
            let texture = if index == tail_index {
                assets.snake_tail.clone()
            } else {
                assets.snake_body.clone()
            };

            match bodies.next() {
                Some((_, mut transform, mut handle)) => {
                    *handle = texture;
                    place_segment(&mut transform, position, heading, &draw_configuration);
                }
                None => {
                    let mut body = sprite(texture, &draw_configuration);
                    place_segment(&mut body.transform, position, heading, &draw_configuration);
                    commands.spawn_bundle(body).insert(BodySnakeComponent);
                }
            }
        }
    }

    // The remaining pieces belong to a longer, previous snake
    bodies.for_each(|(entity, _, _)| {
        commands.entity(entity).despawn();
    });
}

fn update_food(
    snake_game: Res<SnakeGame>,
    draw_configuration: Res<DrawConfigurationResource>,
    mut food_query: Query<(&mut Transform, &mut Visibility), With<FoodComponent>>,
) {
    let (mut transform, mut visibility) = match food_query.get_single_mut() {
        Ok(food) => food,
        Err(_) => return,
    };

    visibility.is_visible = on_board(&snake_game);
    move_to(&mut transform, &snake_game.food(), &draw_configuration);
}

fn shake_camera(
    clock: Res<SimulationClock>,
    configuration: Res<Configuration>,
    mut shake: ResMut<ShakeResource>,
    mut food_ate_event_reader: EventReader<FoodAteEvent>,
    mut camera_query: Query<&mut Transform, With<Camera2d>>,
) {
    let now = clock.now();
    if food_ate_event_reader.iter().count() > 0 {
        shake.started_at = Some(now);
    }

    let offset = match shake.offset(now, &configuration) {
        Some(offset) => offset,
        None => {
            shake.started_at = None;
            Vec2::ZERO
        }
    };

    for mut transform in camera_query.iter_mut() {
        transform.translation.x = offset.x;
        transform.translation.y = offset.y;
    }
}

/// Rotation of the head sprite, drawn facing up.
fn head_angle(direction: Direction) -> f32 {
    match direction {
        Direction::Up => 0.,
        Direction::Down => 2. * FRAC_PI_2,
        Direction::Right => -FRAC_PI_2,
        Direction::Left => FRAC_PI_2,
    }
}

/// Rotation of body and tail sprites, drawn facing down.
fn segment_angle(direction: Direction) -> f32 {
    match direction {
        Direction::Down => 0.,
        Direction::Right => FRAC_PI_2,
        Direction::Up => 2. * FRAC_PI_2,
        Direction::Left => 3. * FRAC_PI_2,
    }
}

fn place_segment(
    transform: &mut Transform,
    position: &Position,
    heading: Direction,
    draw_configuration: &DrawConfigurationResource,
) {
    move_to(transform, position, draw_configuration);
    transform.translation.z = SNAKE_Z;
    transform.rotation = Quat::from_rotation_z(segment_angle(heading));
}

fn sprite(texture: Handle<Image>, draw_configuration: &DrawConfigurationResource) -> SpriteBundle {
    let cell_size = draw_configuration.cell_size;
    SpriteBundle {
        sprite: Sprite {
            custom_size: Some(Vec2::new(cell_size, cell_size)),
            ..default()
        },
        texture,
        ..default()
    }
}

/// Grid rows grow downwards, world y grows upwards.
fn move_to(
    transform: &mut Transform,
    to: &Position,
    draw_configuration: &DrawConfigurationResource,
) {
    transform.translation.x = to.x as f32 * draw_configuration.cell_size
        + draw_configuration.origin.0
        + draw_configuration.half_cell;
    transform.translation.y = draw_configuration.origin.1
        - to.y as f32 * draw_configuration.cell_size
        - draw_configuration.half_cell;
}

pub mod resources {
    use bevy::prelude::Vec2;

    use crate::{configuration::Configuration, snake::Millis};

    #[derive(Clone)]
    pub struct DrawConfigurationResource {
        pub half_cell: f32,
        pub cell_size: f32,
        /// World coordinates of the board's top-left corner.
        pub origin: (f32, f32),
    }

    #[derive(Default)]
    pub struct ShakeResource {
        pub started_at: Option<Millis>,
    }

    impl ShakeResource {
        /// Random camera offset while the shake lasts, `None` once it is over.
        pub fn offset(&self, now: Millis, configuration: &Configuration) -> Option<Vec2> {
            let started_at = self.started_at?;
            if now.saturating_sub(started_at) >= configuration.shake_duration_ms {
                return None;
            }

            let strength = configuration.shake_strength;
            Some(Vec2::new(
                fastrand::i32(-strength..=strength) as f32,
                fastrand::i32(-strength..=strength) as f32,
            ))
        }
    }
}

mod components {
    use bevy::prelude::Component;

    #[derive(Component)]
    pub struct HeadSnakeComponent;

    #[derive(Component)]
    pub struct BodySnakeComponent;

    #[derive(Component)]
    pub struct FoodComponent;
}

#[cfg(test)]
mod tests {
    use bevy::prelude::{Transform, Vec2};

    use super::{
        head_angle, move_to, resources::DrawConfigurationResource, resources::ShakeResource,
        segment_angle,
    };
    use crate::{
        configuration::Configuration,
        snake::{Direction, Position},
    };

    fn draw_configuration() -> DrawConfigurationResource {
        DrawConfigurationResource {
            cell_size: 25.,
            half_cell: 12.5,
            origin: (-400., 300.),
        }
    }

    #[test]
    fn test_cells_map_to_world_centers() {
        let mut transform = Transform::default();

        move_to(&mut transform, &Position::new(0, 0), &draw_configuration());
        assert_eq!(transform.translation.truncate(), Vec2::new(-387.5, 287.5));

        move_to(&mut transform, &Position::new(16, 12), &draw_configuration());
        assert_eq!(transform.translation.truncate(), Vec2::new(12.5, -12.5));
    }

    #[test]
    fn test_sprites_face_their_heading() {
        assert_eq!(head_angle(Direction::Up), 0.);
        assert_eq!(segment_angle(Direction::Down), 0.);
        assert_eq!(
            head_angle(Direction::Left),
            -head_angle(Direction::Right)
        );
    }

    #[test]
    fn test_shake_stops_after_its_duration() {
        let configuration = Configuration::default();
        let shake = ShakeResource {
            started_at: Some(1_000),
        };

        let offset = shake.offset(1_100, &configuration).unwrap();
        assert!(offset.x.abs() <= 4. && offset.y.abs() <= 4.);
        assert_eq!(shake.offset(1_150, &configuration), None);
        assert_eq!(ShakeResource::default().offset(0, &configuration), None);
    }
}
