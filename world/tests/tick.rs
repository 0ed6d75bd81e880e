use std::cell::RefCell;
use std::rc::Rc;

use snake_arena_core::{
    CellCoord, DeathCause, Direction, Event, EventBus, EventKind, GridSize, PlayerId,
};
use snake_arena_world::{self as world, query, CellState, MoveIntents, SpawnPlan, World};

fn arena() -> (World, EventBus) {
    (World::new(GridSize::new(10, 10)), EventBus::new())
}

fn plan(head: CellCoord, heading: Direction, length: u32) -> SpawnPlan {
    SpawnPlan {
        head,
        heading,
        length,
    }
}

/// Binds a recording handler to every event kind.
fn record_events(bus: &mut EventBus) -> Rc<RefCell<Vec<Event>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for kind in EventKind::ALL {
        let log = Rc::clone(&log);
        let _ = bus.bind(
            kind,
            Box::new(move |event, _| {
                log.borrow_mut().push(event.clone());
                Ok(())
            }),
        );
    }
    log
}

fn intent(player: PlayerId, direction: Direction) -> MoveIntents {
    let mut intents = MoveIntents::new();
    intents.set(player, direction);
    intents
}

#[test]
fn a_tick_moves_the_head_to_an_adjacent_cell() {
    let (mut world, mut bus) = arena();
    let (player, _) = world
        .join_player("alpha", plan(CellCoord::new(5, 5), Direction::Right, 3), &mut bus)
        .expect("join succeeds");

    for direction in [Direction::Right, Direction::Up, Direction::Left] {
        let before = query::snake_view(&world)[0].head();
        world::update(&mut world, &intent(player, direction), &mut bus).expect("tick succeeds");
        let after = query::snake_view(&world)[0].head();
        assert_eq!(before.manhattan_distance(after), 1, "no teleporting");
    }
}

#[test]
fn no_two_snakes_share_a_cell_after_any_tick() {
    let (mut world, mut bus) = arena();
    let (first, _) = world
        .join_player("alpha", plan(CellCoord::new(4, 2), Direction::Right, 3), &mut bus)
        .expect("join succeeds");
    let (second, _) = world
        .join_player("beta", plan(CellCoord::new(4, 7), Direction::Right, 3), &mut bus)
        .expect("join succeeds");

    for _ in 0..4 {
        let mut intents = MoveIntents::new();
        intents.set(first, Direction::Down);
        intents.set(second, Direction::Up);
        world::update(&mut world, &intents, &mut bus).expect("tick succeeds");

        let mut seen = Vec::new();
        for snapshot in query::snake_view(&world) {
            for cell in &snapshot.segments {
                assert!(
                    query::grid(&world).contains(*cell),
                    "segment off the field: {cell:?}"
                );
                assert!(!seen.contains(cell), "cell occupied twice: {cell:?}");
                seen.push(*cell);
            }
        }
    }
}

#[test]
fn eating_grows_by_exactly_one_segment() {
    let (mut world, mut bus) = arena();
    let log = record_events(&mut bus);
    let (player, snake) = world
        .join_player("alpha", plan(CellCoord::new(5, 5), Direction::Right, 3), &mut bus)
        .expect("join succeeds");
    let food = world
        .spawn_food(CellCoord::new(6, 5), 7, &mut bus)
        .expect("food placed");

    world::update(&mut world, &intent(player, Direction::Right), &mut bus).expect("tick succeeds");

    let snapshot = &query::snake_view(&world)[0];
    assert_eq!(snapshot.head(), CellCoord::new(6, 5));
    assert_eq!(snapshot.segments.len(), 4, "grew by exactly one");
    assert_eq!(
        query::cell_state(&world, CellCoord::new(6, 5)),
        Some(CellState::Snake(snake))
    );
    assert!(query::food_view(&world).is_empty(), "food was consumed");

    let events = log.borrow();
    assert!(events.contains(&Event::SnakeAte {
        snake,
        player,
        food,
        cell: CellCoord::new(6, 5),
        score: 7,
    }));
    assert!(events.contains(&Event::FoodRemoved {
        food,
        cell: CellCoord::new(6, 5),
    }));

    // The next tick without food keeps the length unchanged.
    drop(events);
    world::update(&mut world, &intent(player, Direction::Right), &mut bus).expect("tick succeeds");
    assert_eq!(query::snake_view(&world)[0].segments.len(), 4);
}

#[test]
fn reversal_keeps_the_snake_moving_straight() {
    let (mut world, mut bus) = arena();
    let (player, _) = world
        .join_player("alpha", plan(CellCoord::new(5, 5), Direction::Right, 3), &mut bus)
        .expect("join succeeds");
    // Body occupies (5,5)-(4,5)-(3,5); LEFT would reverse into the neck.
    world::update(&mut world, &intent(player, Direction::Left), &mut bus).expect("tick succeeds");

    let snapshot = &query::snake_view(&world)[0];
    assert_eq!(snapshot.heading, Direction::Right);
    assert_eq!(snapshot.head(), CellCoord::new(6, 5), "continued straight");
}

#[test]
fn hitting_the_wall_kills_the_snake() {
    let (mut world, mut bus) = arena();
    let log = record_events(&mut bus);
    let (player, snake) = world
        .join_player("alpha", plan(CellCoord::new(9, 5), Direction::Right, 3), &mut bus)
        .expect("join succeeds");

    world::update(&mut world, &MoveIntents::new(), &mut bus).expect("tick succeeds");

    assert!(query::snake_view(&world).is_empty());
    assert!(log.borrow().contains(&Event::SnakeDied {
        snake,
        player,
        cause: DeathCause::Wall,
    }));
    // Every cell the dead snake occupied was released in the same tick.
    for column in 0..10 {
        for row in 0..10 {
            assert_eq!(
                query::cell_state(&world, CellCoord::new(column, row)),
                Some(CellState::Empty)
            );
        }
    }
}

#[test]
fn turning_into_your_own_body_is_fatal() {
    let (mut world, mut bus) = arena();
    let log = record_events(&mut bus);
    let (player, snake) = world
        .join_player("alpha", plan(CellCoord::new(5, 5), Direction::Right, 5), &mut bus)
        .expect("join succeeds");

    world::update(&mut world, &intent(player, Direction::Up), &mut bus).expect("tick succeeds");
    world::update(&mut world, &intent(player, Direction::Left), &mut bus).expect("tick succeeds");
    world::update(&mut world, &intent(player, Direction::Down), &mut bus).expect("tick succeeds");

    assert!(query::snake_view(&world).is_empty());
    assert!(log.borrow().contains(&Event::SnakeDied {
        snake,
        player,
        cause: DeathCause::SelfCollision,
    }));
}

#[test]
fn simultaneous_head_on_collision_kills_both() {
    let (mut world, mut bus) = arena();
    let log = record_events(&mut bus);
    // Heads at (3,5) and (5,5) converge on (4,5) in the same tick.
    let (_, first) = world
        .join_player("alpha", plan(CellCoord::new(3, 5), Direction::Right, 2), &mut bus)
        .expect("join succeeds");
    let (_, second) = world
        .join_player("beta", plan(CellCoord::new(5, 5), Direction::Left, 2), &mut bus)
        .expect("join succeeds");

    world::update(&mut world, &MoveIntents::new(), &mut bus).expect("tick succeeds");

    assert!(query::snake_view(&world).is_empty(), "both snakes died");
    let deaths: Vec<_> = log
        .borrow()
        .iter()
        .filter_map(|event| match event {
            Event::SnakeDied { snake, cause, .. } => Some((*snake, *cause)),
            _ => None,
        })
        .collect();
    assert_eq!(
        deaths,
        vec![
            (first, DeathCause::HeadOnCollision { other: second }),
            (second, DeathCause::HeadOnCollision { other: first }),
        ]
    );
}

#[test]
fn running_into_another_snakes_body_kills_only_the_runner() {
    let (mut world, mut bus) = arena();
    let log = record_events(&mut bus);
    let (_, runner) = world
        .join_player("alpha", plan(CellCoord::new(5, 3), Direction::Down, 2), &mut bus)
        .expect("join succeeds");
    let (victim_player, victim) = world
        .join_player("beta", plan(CellCoord::new(6, 4), Direction::Right, 3), &mut bus)
        .expect("join succeeds");

    // Runner's head moves onto (5,4), the middle of beta's body.
    world::update(&mut world, &MoveIntents::new(), &mut bus).expect("tick succeeds");

    let survivors = query::snake_view(&world);
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].id, victim);
    assert_eq!(survivors[0].player, victim_player);
    assert!(log.borrow().iter().any(|event| matches!(
        event,
        Event::SnakeDied {
            snake,
            cause: DeathCause::SnakeCollision { other },
            ..
        } if *snake == runner && *other == victim
    )));
}

#[test]
fn entering_a_vacated_tail_cell_is_not_a_collision() {
    let (mut world, mut bus) = arena();
    // Beta trails alpha directly: its candidate head is alpha's tail cell,
    // which alpha vacates in the same tick.
    let _ = world
        .join_player("alpha", plan(CellCoord::new(5, 5), Direction::Right, 3), &mut bus)
        .expect("join succeeds");
    let _ = world
        .join_player("beta", plan(CellCoord::new(2, 5), Direction::Right, 2), &mut bus)
        .expect("join succeeds");

    world::update(&mut world, &MoveIntents::new(), &mut bus).expect("tick succeeds");

    let survivors = query::snake_view(&world);
    assert_eq!(survivors.len(), 2, "tail-following is legal");
    assert_eq!(survivors[1].head(), CellCoord::new(3, 5));
}

#[test]
fn deaths_are_announced_before_meals_within_a_tick() {
    let (mut world, mut bus) = arena();
    let log = record_events(&mut bus);
    let (_, doomed) = world
        .join_player("alpha", plan(CellCoord::new(9, 2), Direction::Right, 2), &mut bus)
        .expect("join succeeds");
    let (_, eater) = world
        .join_player("beta", plan(CellCoord::new(5, 7), Direction::Right, 2), &mut bus)
        .expect("join succeeds");
    let _ = world
        .spawn_food(CellCoord::new(6, 7), 1, &mut bus)
        .expect("food placed");

    world::update(&mut world, &MoveIntents::new(), &mut bus).expect("tick succeeds");

    let positions: Vec<_> = log
        .borrow()
        .iter()
        .filter_map(|event| match event {
            Event::SnakeDied { snake, .. } if *snake == doomed => Some("died"),
            Event::SnakeAte { snake, .. } if *snake == eater => Some("ate"),
            _ => None,
        })
        .collect();
    assert_eq!(positions, vec!["died", "ate"]);
}

#[test]
fn a_paused_world_ignores_ticks() {
    let (mut world, mut bus) = arena();
    let (player, _) = world
        .join_player("alpha", plan(CellCoord::new(5, 5), Direction::Right, 3), &mut bus)
        .expect("join succeeds");

    world.set_paused(true);
    world::update(&mut world, &intent(player, Direction::Up), &mut bus).expect("tick succeeds");
    assert_eq!(world.tick_index(), 0);
    assert_eq!(query::snake_view(&world)[0].head(), CellCoord::new(5, 5));

    world.set_paused(false);
    world::update(&mut world, &intent(player, Direction::Up), &mut bus).expect("tick succeeds");
    assert_eq!(world.tick_index(), 1);
    assert_eq!(query::snake_view(&world)[0].head(), CellCoord::new(5, 4));
}

#[test]
fn spawning_on_an_occupied_cell_is_rejected() {
    let (mut world, mut bus) = arena();
    let _ = world
        .join_player("alpha", plan(CellCoord::new(5, 5), Direction::Right, 3), &mut bus)
        .expect("join succeeds");

    assert!(world
        .join_player("beta", plan(CellCoord::new(4, 5), Direction::Up, 2), &mut bus)
        .is_err());
    assert!(world.spawn_food(CellCoord::new(5, 5), 1, &mut bus).is_err());
    assert!(world
        .spawn_food(CellCoord::new(20, 5), 1, &mut bus)
        .is_err());
}
