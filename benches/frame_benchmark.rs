//! Frame benchmark: tree rebuild and frame rendering.
//!
//! Target: a 500-action tree rebuilds and renders well within a 16ms frame.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use chrono::Utc;
use tasklog::action::{ActionRecord, ActionUpdate, Arg};
use tasklog::actor::ConsoleEvent;
use tasklog::state::ActionItem;
use tasklog::tree::ActionTree;
use tasklog::{ConsoleConfig, ConsoleState, LogSources, SharedOutput};

/// A tree with `fanout` children per node, `n` actions in total.
fn records(n: usize, fanout: usize) -> Vec<ActionRecord> {
    (0..n)
        .map(|i| {
            let record = ActionRecord::new(format!("a{i}"), format!("step.{i}"))
                .with_arg(Arg::new("index", i))
                .start();
            if i == 0 {
                record
            } else {
                record.with_parent(format!("a{}", (i - 1) / fanout))
            }
        })
        .collect()
}

fn update(record: ActionRecord) -> ActionUpdate {
    ActionUpdate {
        record,
        ..ActionUpdate::default()
    }
}

fn tree_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_rebuild");
    for n in [50, 500, 5000] {
        let items: Vec<ActionItem> = records(n, 4)
            .into_iter()
            .map(|r| ActionItem::new(update(r)))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &items, |b, items| {
            b.iter(|| ActionTree::build(black_box(items)));
        });
    }
    group.finish();
}

fn frame_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_render");
    for n in [50, 500] {
        let mut state = ConsoleState::new(
            ConsoleConfig::default(),
            SharedOutput::new(std::io::sink()),
            LogSources::default(),
        );
        let now = Utc::now();
        for record in records(n, 4) {
            let _ = state.apply(ConsoleEvent::Action(Box::new(update(record))), now);
        }

        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            let mut frame = 0i64;
            b.iter(|| {
                // A different timestamp every frame so the differ has work to do.
                frame += 1;
                let at = now + chrono::Duration::milliseconds(frame * 100);
                state.render(black_box(at), Some((200, 60)), false);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, tree_rebuild, frame_render);
criterion_main!(benches);
