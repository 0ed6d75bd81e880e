use std::cell::RefCell;
use std::rc::Rc;

use snake_arena_core::{CellCoord, Direction, Event, EventBus, EventKind, GridSize};
use snake_arena_system_food::{Config, FoodPolicy};
use snake_arena_world::{self as world, query, MoveIntents, SpawnPlan, World};

fn spawned_cells(bus: &mut EventBus) -> Rc<RefCell<Vec<CellCoord>>> {
    let cells = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&cells);
    let _ = bus.bind(
        EventKind::FoodSpawned,
        Box::new(move |event, _| {
            if let Event::FoodSpawned { cell, .. } = event {
                sink.borrow_mut().push(*cell);
            }
            Ok(())
        }),
    );
    cells
}

#[test]
fn replenish_tops_up_to_the_target_count() {
    let mut bus = EventBus::new();
    let mut world = World::new(GridSize::new(10, 10));
    let mut policy = FoodPolicy::new(Config::new(3, 5, 0x5eed));

    policy.replenish(&mut world, &mut bus).expect("replenish succeeds");
    assert_eq!(world.food_count(), 3);

    // Already stocked: nothing more appears.
    policy.replenish(&mut world, &mut bus).expect("replenish succeeds");
    assert_eq!(world.food_count(), 3);

    for food in query::food_view(&world) {
        assert_eq!(food.score, 5);
        assert!(query::grid(&world).contains(food.cell));
    }
}

#[test]
fn food_never_lands_on_a_snake() {
    let mut bus = EventBus::new();
    // A 3x3 field almost filled by one snake leaves few empty cells.
    let mut world = World::new(GridSize::new(3, 3));
    let _ = world
        .join_player(
            "alpha",
            SpawnPlan {
                head: CellCoord::new(2, 0),
                heading: Direction::Right,
                length: 3,
            },
            &mut bus,
        )
        .expect("join succeeds");

    let mut policy = FoodPolicy::new(Config::new(4, 1, 7));
    policy.replenish(&mut world, &mut bus).expect("replenish succeeds");

    let snake_cells: Vec<_> = query::snake_view(&world)[0].segments.clone();
    for food in query::food_view(&world) {
        assert!(!snake_cells.contains(&food.cell));
    }
    assert!(world.food_count() <= 4);
}

#[test]
fn identical_seeds_reproduce_the_food_sequence() {
    let run = |seed: u64| {
        let mut bus = EventBus::new();
        let cells = spawned_cells(&mut bus);
        let mut world = World::new(GridSize::new(10, 10));
        let (player, _) = world
            .join_player(
                "alpha",
                SpawnPlan {
                    head: CellCoord::new(5, 5),
                    heading: Direction::Right,
                    length: 3,
                },
                &mut bus,
            )
            .expect("join succeeds");
        let mut policy = FoodPolicy::new(Config::new(2, 1, seed));
        policy.replenish(&mut world, &mut bus).expect("replenish succeeds");
        for direction in [Direction::Up, Direction::Right, Direction::Down] {
            let mut intents = MoveIntents::new();
            intents.set(player, direction);
            world::update(&mut world, &intents, &mut bus).expect("tick succeeds");
            policy.replenish(&mut world, &mut bus).expect("replenish succeeds");
        }
        let spawned = cells.borrow().clone();
        spawned
    };

    assert_eq!(run(42), run(42));
    assert_ne!(run(42), run(43), "different seeds diverge");
}
