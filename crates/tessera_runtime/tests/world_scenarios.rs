use tessera_core::define_component;
use tessera_runtime::{World, WorldError};

#[derive(Debug, Clone, PartialEq)]
struct A(u32);
define_component!(A);

#[derive(Debug, Clone, PartialEq)]
struct B(&'static str);
define_component!(B);

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn sorted(mut entities: Vec<tessera_core::ecs::Entity>) -> Vec<u64> {
    entities.sort();
    entities.into_iter().map(|e| e.id()).collect()
}

#[test]
fn three_entity_scenario() {
    init_logging();
    let mut world = World::new();
    let e1 = world.spawn();
    let e2 = world.spawn();
    let e3 = world.spawn();
    assert_eq!([e1.id(), e2.id(), e3.id()], [1, 2, 3]);

    world.insert(e1, A(1)).expect("alive");
    world.insert(e2, A(2)).expect("alive");
    world.insert(e2, B("two")).expect("alive");
    world.insert(e3, B("three")).expect("alive");

    assert_eq!(sorted(world.query().with::<A>().entities()), [1, 2]);
    assert_eq!(sorted(world.query().with::<B>().entities()), [2, 3]);
    assert_eq!(sorted(world.query().with::<A>().with::<B>().entities()), [2]);

    assert!(world.remove::<A>(e2));
    assert!(world.query().with::<A>().with::<B>().entities().is_empty());
    assert_eq!(sorted(world.query().with::<B>().entities()), [2, 3]);
    assert_eq!(world.get::<B>(e2), Some(&B("two")));
}

#[test]
fn recycled_handle_starts_empty() {
    init_logging();
    let mut world = World::new();
    let first = world.spawn();
    world.insert(first, A(7)).expect("alive");
    world.insert(first, B("old")).expect("alive");

    assert!(world.despawn(first));
    assert!(!world.is_alive(first));
    assert_eq!(
        world.insert(first, A(8)),
        Err(WorldError::EntityNotAlive { entity: first })
    );

    let reused = world.spawn();
    assert_eq!(reused.id(), first.id());
    assert!(world.is_alive(reused));
    assert!(!world.has::<A>(reused));
    assert!(!world.has::<B>(reused));
    assert!(world.query_one::<A>().is_empty());
    assert!(world.store().location_of(reused).is_none());
}

#[test]
fn batched_spawn_is_visible_after_batch() {
    init_logging();
    let mut world = World::new();
    let seed = world.spawn();
    world.insert(seed, A(0)).expect("alive");
    assert_eq!(world.query().with::<A>().count(), 1);

    world.batch(|world| {
        for i in 1..=10 {
            let entity = world.spawn();
            world.insert(entity, A(i)).expect("alive");
            if i % 2 == 0 {
                world.insert(entity, B("even")).expect("alive");
            }
        }
    });

    assert_eq!(world.query().with::<A>().count(), 11);
    assert_eq!(world.query().with::<A>().with::<B>().count(), 5);
    for entity in world.query().with::<B>().entities() {
        assert_eq!(world.get::<A>(entity).map(|a| a.0 % 2), Some(0));
    }
}

#[test]
fn despawn_compacts_neighbours() {
    init_logging();
    let mut world = World::new();
    let entities: Vec<_> = (0..5u32)
        .map(|i| {
            let entity = world.spawn();
            world.insert(entity, A(i)).expect("alive");
            entity
        })
        .collect();

    assert!(world.despawn(entities[1]));
    assert!(world.despawn(entities[3]));

    for (i, &entity) in entities.iter().enumerate() {
        let expected = (i != 1 && i != 3).then_some(A(i as u32));
        assert_eq!(world.get::<A>(entity).cloned(), expected);
    }
    assert_eq!(world.stats().live_entity_count, 3);
}

#[test]
fn stats_serialize_to_json() {
    let mut world = World::new();
    let entity = world.spawn();
    world.insert(entity, A(1)).expect("alive");
    world.query().with::<A>().entities();

    let json = serde_json::to_value(world.stats()).expect("serialize");
    assert_eq!(json["archetype_count"], 1);
    assert_eq!(json["live_entity_count"], 1);
    assert_eq!(json["cached_query_count"], 1);
    assert_eq!(json["component_type_count"], 1);
}
