use perspective::{
    GridPoint, LocalDirection, NetworkConfig, NodeId, NodeKind,
    NodeNeighbors, Scenario, SuperTileType, TileId, TileNode,
    TileNodeNetwork, TileType,
};

fn network() -> TileNodeNetwork {
    TileNodeNetwork::new(NetworkConfig::default()).unwrap()
}

fn center(network: &TileNodeNetwork, tile: TileId) -> NodeId {
    network.tile(tile).unwrap().center()
}

/// The node a center links to at a diagonal
fn corner(
    network: &TileNodeNetwork,
    tile: TileId,
    diagonal: LocalDirection,
) -> (NodeId, &TileNode) {
    let center_id = center(network, tile);
    let link = network
        .node(center_id)
        .unwrap()
        .as_center()
        .unwrap()
        .neighbor(diagonal)
        .unwrap();
    (link.node, network.node(link.node).unwrap())
}

/// A closed cube spanning x and y in -1..1 and z in 0..2 (half-tiles)
fn cube(network: &mut TileNodeNetwork) -> Vec<TileId> {
    let faces = [
        (GridPoint::new(0, 0, 0), SuperTileType::Xy),
        (GridPoint::new(0, 0, 2), SuperTileType::Xy),
        (GridPoint::new(0, -1, 1), SuperTileType::Xz),
        (GridPoint::new(0, 1, 1), SuperTileType::Xz),
        (GridPoint::new(-1, 0, 1), SuperTileType::Yz),
        (GridPoint::new(1, 0, 1), SuperTileType::Yz),
    ];
    faces
        .iter()
        .map(|&(position, super_type)| {
            let tile = network.create_tile_pair(position, super_type).unwrap();
            network.check_consistency().unwrap();
            tile
        })
        .collect()
}

#[test]
fn test_two_by_two_shares_corner() {
    let mut network = network();
    let tiles: Vec<TileId> = [(0, 0), (2, 0), (0, 2), (2, 2)]
        .iter()
        .map(|&(x, y)| {
            network
                .create_tile_pair(GridPoint::new(x, y, 0), SuperTileType::Xy)
                .unwrap()
        })
        .collect();
    network.check_consistency().unwrap();
    assert_eq!(network.tile_count(), 8);

    // All 4 front quadrants around (1, 1, 0) meet at one full corner
    let diagonals = [
        LocalDirection::D01,
        LocalDirection::D12,
        LocalDirection::D30,
        LocalDirection::D23,
    ];
    let (shared, node) = corner(&network, tiles[0], diagonals[0]);
    assert_eq!(node.kind(), NodeKind::Corner);
    assert_eq!(node.position(), GridPoint::new(1, 1, 0));
    for (tile, diagonal) in tiles.iter().zip(diagonals) {
        assert_eq!(corner(&network, *tile, diagonal).0, shared);
    }
    let members = network
        .trace_corner(center(&network, tiles[0]), diagonals[0])
        .unwrap();
    assert_eq!(members.len(), 4);

    // Pull out one tile and the corner is demoted. The front faces keep one
    // degenerate corner and the back faces another, 3 quadrants each
    assert!(network.remove_tile_pair(tiles[3]));
    network.check_consistency().unwrap();
    let (front_id, node) = corner(&network, tiles[0], diagonals[0]);
    let front = node.as_degenerate().unwrap();
    assert_eq!(front.pairs().len(), 3);
    assert_eq!(front.component_count(), 6);
    let backs: Vec<TileId> = tiles
        .iter()
        .take(3)
        .map(|tile| network.tile(*tile).unwrap().sibling())
        .collect();
    let (back_id, node) = corner(&network, backs[0], diagonals[0]);
    let back = node.as_degenerate().unwrap();
    assert_ne!(back_id, front_id);
    assert_eq!(back.pairs().len(), 3);
    assert_eq!(back.component_count(), 6);
    assert_eq!(node.position(), GridPoint::new(1, 1, 0));
    for (tile, diagonal) in tiles.iter().zip(diagonals).take(3) {
        assert_eq!(corner(&network, *tile, diagonal).0, front_id);
    }
    for back_tile in &backs {
        let back_center = center(&network, *back_tile);
        assert!(back.pairs().iter().any(|pair| pair.center == back_center));
    }

    // Putting it back restores a full corner
    let restored = network
        .create_tile_pair(GridPoint::new(2, 2, 0), SuperTileType::Xy)
        .unwrap();
    network.check_consistency().unwrap();
    assert_eq!(
        corner(&network, restored, LocalDirection::D23).1.kind(),
        NodeKind::Corner
    );
}

#[test]
fn test_cube() {
    let mut network = network();
    let faces = cube(&mut network);
    assert_eq!(network.tile_count(), 12);
    // 12 centers, 2 side nodes per cube edge and 2 degenerate corners per
    // cube vertex
    assert_eq!(network.node_count(), 12 + 24 + 16);

    for (_, node) in network.nodes() {
        assert_ne!(node.kind(), NodeKind::Corner);
        if let Some(degen) = node.as_degenerate() {
            assert_eq!(degen.pairs().len(), 3);
        }
    }
    // Nothing wraps around to its own sibling on a closed surface
    for (id, tile) in network.tiles() {
        for link in tile.neighbors() {
            let link = link.unwrap();
            assert_ne!(link.tile, id);
            assert_ne!(link.tile, tile.sibling());
        }
    }

    // Tear it down one face at a time
    for face in faces {
        assert!(network.remove_tile_pair(face));
        network.check_consistency().unwrap();
    }
    assert_eq!(network.tile_count(), 0);
    assert_eq!(network.node_count(), 0);
    assert!(network.forces().is_empty());
}

#[test]
fn test_force_around_cube() {
    let mut network = network();
    cube(&mut network);
    let top = network.tile_at(GridPoint::new(0, 0, 2)).unwrap();
    assert!(network.set_tile_force(top, LocalDirection::D0));

    let start = center(&network, top);
    let mut node = start;
    let mut visited = Vec::new();
    for _ in 0..4 {
        node = network.propagate_force(node).unwrap();
        let center = network.node(node).unwrap().as_center().unwrap();
        visited.push((center.position(), center.tile_type()));
    }

    // Straight around the outside of the belt and back, still heading the
    // same way
    assert_eq!(
        visited,
        vec![
            (GridPoint::new(1, 0, 1), TileType::YzFront),
            (GridPoint::new(0, 0, 0), TileType::XyBack),
            (GridPoint::new(-1, 0, 1), TileType::YzBack),
            (GridPoint::new(0, 0, 2), TileType::XyFront),
        ]
    );
    assert_eq!(node, start);
    assert_eq!(network.tile_force(top), Some(LocalDirection::D0));
}

#[test]
fn test_wall_on_floor() {
    let mut network = network();
    let floor = network
        .create_tile_pair(GridPoint::ORIGIN, SuperTileType::Xy)
        .unwrap();
    let wall = network
        .create_tile_pair(GridPoint::new(1, 0, 1), SuperTileType::Yz)
        .unwrap();
    network.check_consistency().unwrap();

    // The top of the floor turns up into the wall, the wall's -x face
    let link = network
        .tile(floor)
        .unwrap()
        .neighbor(LocalDirection::D0)
        .unwrap();
    let wall_back = network.tile(wall).unwrap().sibling();
    assert_eq!(link.tile, wall_back);

    // Without the wall, the floor wraps around onto its own underside
    assert!(network.remove_tile_pair(wall_back));
    network.check_consistency().unwrap();
    let link = network
        .tile(floor)
        .unwrap()
        .neighbor(LocalDirection::D0)
        .unwrap();
    assert_eq!(link.tile, network.tile(floor).unwrap().sibling());
}

#[test]
fn test_random_scenarios_stay_consistent() {
    for seed in 0..8 {
        let scenario = Scenario::random(seed, 80, 2);
        let mut output = scenario.run().unwrap();
        let network = &mut output.network;
        network
            .check_consistency()
            .unwrap_or_else(|error| panic!("seed {}: {:#}", seed, error));
        assert!(network.stale_tiles().is_empty());

        let fronts: Vec<TileId> = network
            .tiles()
            .filter(|(_, tile)| tile.tile_type().is_front())
            .map(|(id, _)| id)
            .collect();
        for tile in fronts {
            assert!(network.remove_tile_pair(tile));
            network
                .check_consistency()
                .unwrap_or_else(|error| panic!("seed {}: {:#}", seed, error));
        }
        assert_eq!(network.node_count(), 0, "seed {}", seed);
    }
}

#[test]
fn test_gpu_buffers() {
    let mut network = network();
    cube(&mut network);
    let tiles = network.gpu_tiles();
    let infos = network.gpu_node_infos();
    assert_eq!(tiles.len(), 12);
    assert_eq!(infos.len(), 12);
    // One force block per node
    let forces = network.forces();
    assert_eq!(forces.len(), network.node_count());
    assert_eq!(forces.flags().len(), forces.block_count() * 4);
}
