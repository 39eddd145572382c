//! End-to-end scenarios for the mining game

use rewrite_sim::prelude::*;

fn a() -> Address {
    Address::new("A", "a", 10)
}

fn b() -> Address {
    Address::new("B", "b", 10)
}

fn extend(tree: &mut BlockTree, parent: BlockLink, nonce: &str) -> BlockLink {
    let tx = Transaction::new(a(), b(), 1);
    let block = Block::new(tx, parent, tree.link_hash(parent), nonce.into());

    tree.publish(block, MinerId::from(0)).unwrap().into()
}

#[test]
fn transfer_on_empty_chain() {
    let tree = BlockTree::new();
    let chain = tree.chain_for_block(BlockLink::Empty);
    let tx = Transaction::new(a(), b(), 5);

    assert_eq!(balance_for(&chain, &a()), 10);
    assert!(is_valid_tx(&chain, &tx));
}

#[test]
fn balances_after_one_block() {
    let mut tree = BlockTree::new();
    let tx = Transaction::new(a(), b(), 5);
    let block = Block::new(
        tx,
        BlockLink::Empty,
        tree.link_hash(BlockLink::Empty),
        "00000".into(),
    );
    let id = tree.publish(block, MinerId::from(0)).unwrap();
    let chain = confirmed_chain(&tree.chain_for_block(id.into()), 0);

    assert_eq!(balance_for(&chain, &a()), 5);
    assert_eq!(balance_for(&chain, &b()), 15);
}

#[test]
fn toy_difficulty() {
    assert!(meets_difficulty("0abcd"));
    assert!(!meets_difficulty("1abcd"));
}

#[test]
fn attacker_mines_on_competing_tip() {
    let mut model = Model::new(Config::default(), 2);
    let root = extend(&mut model.tree, BlockLink::Empty, "root");
    let x = extend(&mut model.tree, root, "x");
    let y = extend(&mut model.tree, x, "y");
    let competitor = extend(&mut model.tree, root, "competitor");
    model.discovered_blocks = model.tree.tips();

    let model = model.advance(Event::SelectEraseTarget {
        miner: MinerId::from(1),
        target: x,
    });

    assert_eq!(model.block_to_mine(&model.miners[0]), Some(y));
    assert_eq!(model.block_to_mine(&model.miners[1]), Some(competitor));
}

#[test]
fn attack_overtakes_canonical_chain() {
    // A lone miner builds the chain, then turns on its own history and
    // mines until its branch is the longest chain.
    let mut model = Model::new(Config::default(), 1)
        .advance(Event::ProvideNames(vec!["A".into(), "B".into()]));
    let (a, b) = (
        model.address_book[0].hash.clone(),
        model.address_book[1].hash.clone(),
    );
    for _ in 0..200 {
        model = model.advance(Event::SubmitTransaction {
            sender: a.clone(),
            receiver: b.clone(),
            amount: 1,
        });
    }

    let mut seed = 0;
    while model.tree.num_blocks() < 2 {
        model = model
            .advance(Event::SeedRandom(seed))
            .advance(Event::AdvanceRound);
        seed += 1;
    }

    let target = model.erasable_blocks()[0];
    model = model.advance(Event::SelectEraseTarget {
        miner: MinerId::from(0),
        target,
    });
    assert!(!model.miners[0].is_honest());

    for _ in 0..2000 {
        if !model.longest_chain().contains_block(target) {
            break;
        }
        model = model
            .advance(Event::SeedRandom(seed))
            .advance(Event::AdvanceRound);
        seed += 1;
    }

    assert!(!model.longest_chain().contains_block(target));
    assert_eq!(model.discovered_blocks, model.tree.tips());
}

#[test]
fn unknown_addresses_degrade_to_sentinel() {
    let model = Model::new(Config::default(), 1)
        .advance(Event::ProvideNames(vec!["A".into()]))
        .advance(Event::SubmitTransaction {
            sender: "missing".into(),
            receiver: "also missing".into(),
            amount: 3,
        })
        .advance(Event::SeedRandom(1))
        .advance(Event::AdvanceRound);

    assert_eq!(model.transaction_pool.len(), 1);
    assert_eq!(model.transaction_pool[0].sender, Address::empty());
    assert!(model.tree.is_empty());
}
