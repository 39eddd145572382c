//! Property-based tests over randomly shaped block trees

use proptest::prelude::*;
use rewrite_sim::prelude::*;

fn addresses() -> Vec<Address> {
    vec![
        Address::new("A", "a", 10),
        Address::new("B", "b", 10),
        Address::new("C", "c", 10),
    ]
}

/// One entry per block: (parent choice, sender, receiver, amount). Block `i`
/// points to `Empty` when `choice % (i + 1) == 0`, and to block
/// `choice % (i + 1) - 1` otherwise.
fn tree_shape() -> impl Strategy<Value = Vec<(usize, usize, usize, i64)>> {
    prop::collection::vec((any::<usize>(), 0..3usize, 0..3usize, 1..8i64), 0..24)
}

fn build_tree(shape: &[(usize, usize, usize, i64)]) -> BlockTree {
    let book = addresses();
    let mut tree = BlockTree::new();

    for (i, &(choice, from, to, amount)) in shape.iter().enumerate() {
        let parent = match choice % (i + 1) {
            0 => BlockLink::Empty,
            k => BlockLink::Block(BlockId::from(k - 1)),
        };
        let tx = Transaction::new(book[from].clone(), book[to].clone(), amount);
        let block =
            Block::new(tx, parent, tree.link_hash(parent), format!("{}", i));

        tree.publish(block, MinerId::from(0)).unwrap();
    }

    tree
}

fn all_links(tree: &BlockTree) -> Vec<BlockLink> {
    tree.iter().map(|(id, _)| BlockLink::Block(id)).collect()
}

proptest! {
    #[test]
    fn chains_end_at_empty(shape in tree_shape()) {
        let tree = build_tree(&shape);

        for (id, data) in tree.iter() {
            let chain = tree.chain_for_block(id.into());

            prop_assert_eq!(chain.links().last(), Some(&BlockLink::Empty));
            prop_assert_eq!(chain.len(), 1 + data.depth);
            prop_assert_eq!(tree.recompute_hash(id), data.block.hash());
        }
    }

    #[test]
    fn balance_replay_is_deterministic(shape in tree_shape()) {
        let tree = build_tree(&shape);

        for tip in tree.tips() {
            let chain = tree.chain_for_block(tip);
            for address in addresses() {
                prop_assert_eq!(
                    balance_for(&chain, &address),
                    balance_for(&chain.clone(), &address)
                );
            }

            let total: i64 = addresses()
                .iter()
                .map(|address| balance_for(&chain, address))
                .sum();
            prop_assert_eq!(total, 30);
        }
    }

    #[test]
    fn accepted_transactions_are_sound(
        shape in tree_shape(),
        from in 0..3usize,
        to in 0..3usize,
        amount in -5..25i64,
        confirmations in 0..3usize,
    ) {
        let tree = build_tree(&shape);
        let book = addresses();
        let tx = Transaction::new(book[from].clone(), book[to].clone(), amount);
        let chain = confirmed_chain(
            &tree.longest_chain(&tree.tips(), TieBreaker::default()),
            confirmations,
        );

        if is_valid_tx(&chain, &tx) {
            prop_assert!(tx.amount > 0);
            prop_assert_ne!(&tx.sender.hash, &tx.receiver.hash);
            prop_assert!(balance_for(&chain, &tx.sender) >= tx.amount);
        }
    }

    #[test]
    fn longest_chain_dominates_every_tip(shape in tree_shape()) {
        let tree = build_tree(&shape);
        let mut links = tree.tips();
        links.extend(all_links(&tree));

        for tie_breaker in
            [TieBreaker::EarliestDiscovered, TieBreaker::LatestDiscovered]
        {
            let longest = tree.longest_chain(&links, tie_breaker);
            for tip in tree.tips() {
                prop_assert!(longest.len() >= tree.chain_for_block(tip).len());
            }
        }
    }

    #[test]
    fn fork_search_never_keeps_target(shape in tree_shape()) {
        let tree = build_tree(&shape);
        let tips = tree.tips();

        for (id, _) in tree.iter() {
            let target = BlockLink::Block(id);
            for preference in [ForkPreference::Nearest, ForkPreference::Farthest]
            {
                let parent = malicious_block_to_mine(
                    &tree,
                    &tips,
                    target,
                    preference,
                    TieBreaker::default(),
                );

                prop_assert!(parent.is_some());
                let chain = tree.chain_for_block(parent.unwrap());
                prop_assert!(!chain.contains_block(target));
            }
        }
    }
}

#[test]
fn longest_chain_of_no_tips_is_empty() {
    let tree = BlockTree::new();

    assert!(tree.longest_chain(&[], TieBreaker::default()).is_empty());
}
