//! Stream tree tests - traversal order, deferral and timers together

use brickfall::core::{Delay, FrameClock, StreamTree, TimedTransition};

#[derive(Debug)]
enum Task {
    Name(&'static str),
    Timer(&'static str, Delay),
    Fade(TimedTransition),
}

#[test]
fn test_timer_fires_once_and_removes_itself() {
    let mut tree = StreamTree::new();
    let root = tree.insert(None, true);
    tree.spawn(root, Task::Name("first"));
    let timer = tree.spawn(root, Task::Timer("timer", Delay::new(150.0)));
    tree.spawn(root, Task::Name("last"));

    let clock = FrameClock::default();
    let mut log = Vec::new();
    for _ in 0..4 {
        for dt in clock.ticks(60.0) {
            tree.call(root, &mut |tree, id, task| match task {
                Task::Name(name) => log.push(*name),
                Task::Timer(name, delay) => {
                    if delay.step(dt) {
                        log.push(*name);
                        tree.destroy(id);
                    }
                }
                Task::Fade(_) => {}
            });
        }
    }

    assert_eq!(log.iter().filter(|&&n| n == "timer").count(), 1);
    // Fired on the third pass, between its siblings.
    assert_eq!(log[4..7], ["first", "timer", "last"]);
    assert!(!tree.contains(timer));
    assert_eq!(tree.children(root).len(), 2);
}

#[test]
fn test_spawned_during_pass_runs_next_pass() {
    let mut tree = StreamTree::new();
    let root = tree.insert(None, true);
    tree.spawn(root, Task::Name("spawner"));

    let mut spawned = false;
    let mut fades = 0;
    for _ in 0..2 {
        tree.call(root, &mut |tree, _id, task| match task {
            Task::Name(_) if !spawned => {
                spawned = true;
                tree.spawn(root, Task::Fade(TimedTransition::new(100.0)));
                assert_eq!(tree.children(root).len(), 1);
            }
            Task::Fade(fade) => {
                assert_eq!(fade.step(60.0), 0.0);
                fades += 1;
            }
            _ => {}
        });
    }
    assert_eq!(fades, 1);
    assert_eq!(tree.children(root).len(), 2);
}

#[test]
fn test_stopped_subtree_is_skipped_and_resumes() {
    let mut tree = StreamTree::new();
    let root = tree.insert(None, true);
    let group = tree.insert(None, true);
    tree.child(root, group);
    tree.spawn(group, Task::Name("inner"));

    let mut count = 0;
    let mut run = |tree: &mut StreamTree<Task>| {
        tree.call(root, &mut |_, _, _| count += 1);
    };

    tree.stop(group);
    run(&mut tree);
    tree.resume(group);
    run(&mut tree);
    drop(run);
    assert_eq!(count, 1);
}

#[test]
fn test_destroying_parent_frees_whole_subtree() {
    let mut tree: StreamTree<Task> = StreamTree::new();
    let root = tree.insert(None, true);
    let group = tree.insert(None, true);
    tree.child(root, group);
    let a = tree.spawn(group, Task::Name("a"));
    let b = tree.spawn(group, Task::Name("b"));
    assert_eq!(tree.len(), 4);

    tree.destroy(group);
    assert!(!tree.contains(a));
    assert!(!tree.contains(b));
    assert!(tree.is_deleted(group));
    assert_eq!(tree.len(), 1);

    // A recycled slot does not revive the old handle.
    let c = tree.spawn(root, Task::Name("c"));
    assert_ne!(c, a);
    assert!(!tree.contains(a));
}

#[test]
fn test_frame_clock_caps_long_frames() {
    let clock = FrameClock::default();
    let ticks: Vec<f64> = clock.ticks(500.0).collect();
    assert_eq!(ticks.len(), 2);
    assert_eq!(ticks.iter().sum::<f64>(), 100.0);
    assert_eq!(clock.ticks(0.0).len(), 0);
}
