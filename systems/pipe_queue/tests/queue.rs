use std::num::NonZeroUsize;

use pipeflow_core::{Pipe, PipeShape};
use pipeflow_system_pipe_queue::PipeQueue;
use proptest::prelude::*;

fn length(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).expect("non-zero length")
}

#[test]
fn replace_token_is_single_use() {
    let mut queue = PipeQueue::seeded(length(4), 3);
    let tail: Vec<Pipe> = queue.visible().skip(1).collect();

    assert!(queue.replace_available());
    assert!(queue.try_replace_head_with_cross());
    assert_eq!(queue.peek(), Pipe::new(PipeShape::Cross));
    assert_eq!(
        queue.visible().skip(1).collect::<Vec<_>>(),
        tail,
        "replacement must only touch the head"
    );

    let _ = queue.consume();
    let head = queue.peek();
    assert!(!queue.try_replace_head_with_cross(), "token already spent");
    assert_eq!(queue.peek(), head, "failed replacement leaves the head alone");
    assert!(!queue.replace_available());
}

#[test]
fn undo_returns_the_pipe_to_the_head() {
    let mut queue = PipeQueue::seeded(length(3), 11);
    let before: Vec<Pipe> = queue.visible().collect();

    let head = queue.consume();
    assert_eq!(head, before[0]);
    queue.undo(head);

    assert_eq!(queue.visible().collect::<Vec<_>>(), before);
}

proptest! {
    #[test]
    fn consume_then_undo_restores_the_visible_queue(
        seed in any::<u64>(),
        visible in 1_usize..8,
        steps in 1_usize..12,
    ) {
        let mut queue = PipeQueue::seeded(length(visible), seed);
        let before: Vec<Pipe> = queue.visible().collect();

        let mut taken = Vec::new();
        for _ in 0..steps {
            taken.push(queue.consume());
        }
        for pipe in taken.into_iter().rev() {
            queue.undo(pipe);
        }

        prop_assert_eq!(queue.visible().collect::<Vec<_>>(), before);
    }

    #[test]
    fn second_replacement_always_fails(seed in any::<u64>(), consumed in 0_usize..5) {
        let mut queue = PipeQueue::seeded(length(3), seed);
        prop_assert!(queue.try_replace_head_with_cross());
        for _ in 0..consumed {
            let _ = queue.consume();
        }
        prop_assert!(!queue.try_replace_head_with_cross());
    }
}
