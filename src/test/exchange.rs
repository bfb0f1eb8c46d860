use {
    crate::{AesBlake, AesBlock, Tier256, Tier512},
    rand::Rng,
};

fn block(data: [u8; 16]) -> AesBlock {
    AesBlock::new(data, vec![[0; 16]; 11])
}

/// Lane states with one marker byte per column: lane 0 holds
/// `1A 2A 3A 4A`, lane 1 `1B 2B 3B 4B`, and so on.
fn marker_blocks() -> Vec<AesBlock> {
    [0x0a, 0x0b, 0x0c, 0x0d]
        .iter()
        .map(|&lane| {
            let mut data = [0; 16];
            for column in 0..4 {
                for i in 0..4 {
                    data[4 * column + i] = ((column as u8 + 1) << 4) | lane;
                }
            }
            block(data)
        })
        .collect()
}

#[test]
fn exchange_512_rotates_columns_across_lanes() {
    let mut blocks = marker_blocks();
    let originals: Vec<[u8; 16]> = blocks.iter().map(|b| *b.state()).collect();

    AesBlake::<Tier512>::exchange_columns(&mut blocks, false);
    let expected = [
        [0x1a, 0x2b, 0x3c, 0x4d],
        [0x1b, 0x2c, 0x3d, 0x4a],
        [0x1c, 0x2d, 0x3a, 0x4b],
        [0x1d, 0x2a, 0x3b, 0x4c],
    ];
    for (block, columns) in blocks.iter().zip(&expected) {
        for (column, &marker) in columns.iter().enumerate() {
            assert!(block.state()[4 * column..4 * column + 4]
                .iter()
                .all(|&b| b == marker));
        }
    }

    AesBlake::<Tier512>::exchange_columns(&mut blocks, true);
    for (block, original) in blocks.iter().zip(&originals) {
        assert_eq!(block.state(), original);
    }
}

#[test]
fn exchange_256_swaps_every_other_column() {
    let mut blocks = marker_blocks();
    blocks.truncate(2);
    let originals: Vec<[u8; 16]> = blocks.iter().map(|b| *b.state()).collect();

    AesBlake::<Tier256>::exchange_columns(&mut blocks, false);
    let expected = [[0x1a, 0x2b, 0x3a, 0x4b], [0x1b, 0x2a, 0x3b, 0x4a]];
    for (block, columns) in blocks.iter().zip(&expected) {
        for (column, &marker) in columns.iter().enumerate() {
            assert!(block.state()[4 * column..4 * column + 4]
                .iter()
                .all(|&b| b == marker));
        }
    }

    // The two-lane pattern is an involution.
    AesBlake::<Tier256>::exchange_columns(&mut blocks, true);
    for (block, original) in blocks.iter().zip(&originals) {
        assert_eq!(block.state(), original);
    }
}

#[test]
fn exchange_inverts_on_random_states() {
    let mut rand = rand::thread_rng();
    for _ in 0..10 {
        let mut blocks: Vec<AesBlock> = (0..4).map(|_| block(rand.gen())).collect();
        let originals: Vec<[u8; 16]> = blocks.iter().map(|b| *b.state()).collect();
        AesBlake::<Tier512>::exchange_columns(&mut blocks, false);
        AesBlake::<Tier512>::exchange_columns(&mut blocks, true);
        for (block, original) in blocks.iter().zip(&originals) {
            assert_eq!(block.state(), original);
        }
    }
}
