use cube_morph::item::Item;
use cube_morph::layout::{ball_positions, grid_cells, pyramid_position, PYRAMID_RING_RADIUS, PYRAMID_RING_Y};

#[test]
fn pyramid_slots_are_deterministic() {
    for index in 0..64 {
        assert_eq!(pyramid_position(index), pyramid_position(index));
    }
}

#[test]
fn indices_past_the_table_sit_on_the_ring() {
    for index in 17..64 {
        let slot = pyramid_position(index);
        assert!((slot.y - PYRAMID_RING_Y).abs() < 1e-5, "index {index} off the ring height");
        let radius = (slot.x * slot.x + slot.z * slot.z).sqrt();
        assert!((radius - PYRAMID_RING_RADIUS).abs() < 1e-4, "index {index} radius {radius}");
    }
}

#[test]
fn grid_item_counts() {
    assert_eq!(grid_cells(true).len(), 17);
    assert_eq!(grid_cells(false).len(), 26);
    assert!(grid_cells(true).iter().all(|cell| cell.coords.x < 1.0));
}

#[test]
fn sphere_cloud_is_reproducible_per_seed() {
    assert_eq!(ball_positions(26, 42), ball_positions(26, 42));
    assert_ne!(ball_positions(26, 42), ball_positions(26, 43));
    for position in ball_positions(26, 7) {
        assert!((-4.0..=4.0).contains(&position.y));
    }
}

#[test]
fn items_start_hidden_at_their_spread_position() {
    let items = Item::build_all(true, 1);
    assert_eq!(items.len(), 17);
    for (index, item) in items.iter().enumerate() {
        assert_eq!(item.index, index);
        assert!(item.is_hidden());
        assert_eq!(item.position(), item.initial_position);
        assert_eq!(item.initial_position, item.grid_target * 8.0);
    }
}
