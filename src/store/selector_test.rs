use super::*;

#[derive(Default)]
struct Counter {
    a: u32,
    b: u32,
    noise: u32,
}

fn doubled_a() -> Memoized<Counter, u32, u32> {
    Memoized::new(|s: &Counter| s.a, |a| a * 2)
}

#[test]
fn computes_on_first_call() {
    let sel = doubled_a();
    assert_eq!(sel.select(&Counter { a: 3, ..Counter::default() }), 6);
    assert_eq!(sel.computations(), 1);
}

#[test]
fn unchanged_dependencies_return_cached_value() {
    let sel = doubled_a();
    sel.select(&Counter { a: 3, ..Counter::default() });
    assert_eq!(sel.select(&Counter { a: 3, noise: 99, ..Counter::default() }), 6);
    assert_eq!(sel.computations(), 1);
}

#[test]
fn changed_dependencies_recompute() {
    let sel = doubled_a();
    sel.select(&Counter { a: 3, ..Counter::default() });
    assert_eq!(sel.select(&Counter { a: 4, ..Counter::default() }), 8);
    assert_eq!(sel.computations(), 2);
}

#[test]
fn tuple_projection_tracks_every_dependency() {
    let sel = Memoized::new(|s: &Counter| (s.a, s.b), |(a, b)| a + b);
    sel.select(&Counter { a: 1, b: 1, noise: 0 });
    sel.select(&Counter { a: 1, b: 2, noise: 0 });
    sel.select(&Counter { a: 1, b: 2, noise: 5 });
    assert_eq!(sel.computations(), 2);
}

#[test]
fn reset_forces_recompute() {
    let sel = doubled_a();
    let state = Counter { a: 1, ..Counter::default() };
    sel.select(&state);
    sel.reset();
    sel.select(&state);
    assert_eq!(sel.computations(), 2);
}
