//! Neighbourhood moves over depot-free vehicle routes.
//!
//! Every move is emitted as the list of routes it rewrites, keyed by vehicle
//! index. The caller prices and filters the candidates.

/// Routes rewritten by a single move.
pub(crate) type Change = Vec<(usize, Vec<usize>)>;

/// Visit every relocate, exchange and 2-opt candidate of `routes`.
pub(crate) fn for_each_candidate(routes: &[Vec<usize>], visit: &mut impl FnMut(Change)) {
    relocate(routes, visit);
    exchange(routes, visit);
    two_opt(routes, visit);
}

/// Move one stop to another position, in the same or another route.
fn relocate(routes: &[Vec<usize>], visit: &mut impl FnMut(Change)) {
    for (from, source) in routes.iter().enumerate() {
        for (position, &stop) in source.iter().enumerate() {
            let mut removed = source.clone();
            removed.remove(position);
            for (to, target) in routes.iter().enumerate() {
                if to == from {
                    for slot in (0..=removed.len()).filter(|&slot| slot != position) {
                        visit(vec![(from, inserted(&removed, slot, stop))]);
                    }
                } else {
                    for slot in 0..=target.len() {
                        visit(vec![
                            (from, removed.clone()),
                            (to, inserted(target, slot, stop)),
                        ]);
                    }
                }
            }
        }
    }
}

/// Swap two stops, within a route or across two routes.
fn exchange(routes: &[Vec<usize>], visit: &mut impl FnMut(Change)) {
    for (a, first) in routes.iter().enumerate() {
        for i in 0..first.len() {
            for j in (i + 2)..first.len() {
                let mut swapped = first.clone();
                swapped.swap(i, j);
                visit(vec![(a, swapped)]);
            }
            for (b, second) in routes.iter().enumerate().skip(a + 1) {
                for j in 0..second.len() {
                    let (Some(&left), Some(&right)) = (first.get(i), second.get(j)) else {
                        continue;
                    };
                    let mut new_first = first.clone();
                    let mut new_second = second.clone();
                    if let Some(slot) = new_first.get_mut(i) {
                        *slot = right;
                    }
                    if let Some(slot) = new_second.get_mut(j) {
                        *slot = left;
                    }
                    visit(vec![(a, new_first), (b, new_second)]);
                }
            }
        }
    }
}

/// Reverse a segment of one route.
fn two_opt(routes: &[Vec<usize>], visit: &mut impl FnMut(Change)) {
    for (vehicle, route) in routes.iter().enumerate() {
        for start in 0..route.len() {
            for end in (start + 1)..route.len() {
                let mut reversed = route.clone();
                if let Some(segment) = reversed.get_mut(start..=end) {
                    segment.reverse();
                }
                visit(vec![(vehicle, reversed)]);
            }
        }
    }
}

fn inserted(route: &[usize], slot: usize, stop: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(route.len() + 1);
    out.extend(route.iter().take(slot).copied());
    out.push(stop);
    out.extend(route.iter().skip(slot).copied());
    out
}
