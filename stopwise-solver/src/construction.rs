//! Initial routes by cheapest-arc extension.
#![expect(
    clippy::float_arithmetic,
    reason = "construction compares accumulated route costs"
)]

use log::debug;

use crate::instance::Instance;

/// Build one route per vehicle.
///
/// Each vehicle leaves the depot and repeatedly takes the cheapest reachable
/// arc to an unvisited stop that fits its remaining capacity and keeps the
/// route, closed back at the depot, within `max_route_cost`. Ties go to the
/// lowest stop index. Stops left over are placed by cheapest insertion in
/// decreasing order of demand, ignoring reachability and the ceiling so the
/// search has a starting point. When the room left by the first pass is too
/// fragmented for insertion, every stop is repacked by [`pack_by_demand`].
/// Returns `None` only when no assignment of stops to vehicles fits the
/// capacities.
pub(crate) fn cheapest_arc_routes(
    instance: &Instance,
    max_route_cost: Option<f64>,
) -> Option<Vec<Vec<usize>>> {
    let mut visited = vec![false; instance.arcs().size()];
    if let Some(depot) = visited.get_mut(instance.depot()) {
        *depot = true;
    }
    let mut routes: Vec<Vec<usize>> = (0..instance.vehicle_count())
        .map(|vehicle| extend_route(instance, vehicle, max_route_cost, &mut visited))
        .collect();

    let mut leftover: Vec<usize> = instance
        .customers()
        .filter(|&stop| !visited.get(stop).copied().unwrap_or(true))
        .collect();
    if !leftover.is_empty() {
        debug!(
            "cheapest-arc pass left {} stop(s) unplaced; falling back to insertion",
            leftover.len()
        );
    }
    leftover.sort_by(|a, b| instance.demand(*b).cmp(&instance.demand(*a)).then(a.cmp(b)));
    let inserted = leftover
        .into_iter()
        .try_for_each(|stop| insert_cheapest(instance, &mut routes, stop));
    if inserted.is_some() {
        return Some(routes);
    }

    debug!("insertion ran out of room; repacking every stop by demand");
    let groups = pack_by_demand(instance)?;
    Some(
        groups
            .into_iter()
            .map(|group| order_by_cheapest_arc(instance, group))
            .collect(),
    )
}

/// Assign every customer to a vehicle without exceeding any capacity.
///
/// Depth-first search over stops in decreasing order of demand. Vehicles
/// with the same free capacity are interchangeable, so only the first of
/// them is tried for each stop, and a branch is cut as soon as the free
/// capacity left cannot hold the demand left. The search is exhaustive:
/// `None` means no assignment exists.
pub(crate) fn pack_by_demand(instance: &Instance) -> Option<Vec<Vec<usize>>> {
    let mut stops: Vec<usize> = instance.customers().collect();
    stops.sort_by(|a, b| instance.demand(*b).cmp(&instance.demand(*a)).then(a.cmp(b)));
    let mut free: Vec<u64> = (0..instance.vehicle_count())
        .map(|vehicle| instance.capacity(vehicle))
        .collect();
    let mut assignment = Vec::with_capacity(stops.len());
    if !place(instance, &stops, &mut free, &mut assignment) {
        return None;
    }

    let mut groups = vec![Vec::new(); instance.vehicle_count()];
    for (stop, vehicle) in stops.into_iter().zip(assignment) {
        groups.get_mut(vehicle)?.push(stop);
    }
    Some(groups)
}

fn place(
    instance: &Instance,
    stops: &[usize],
    free: &mut [u64],
    assignment: &mut Vec<usize>,
) -> bool {
    let Some((&stop, rest)) = stops.split_first() else {
        return true;
    };
    let needed = stops
        .iter()
        .fold(0_u64, |sum, &pending| sum.saturating_add(instance.demand(pending)));
    let available = free.iter().fold(0_u64, |sum, &f| sum.saturating_add(f));
    if available < needed {
        return false;
    }

    let demand = instance.demand(stop);
    let mut tried: Vec<u64> = Vec::new();
    for vehicle in 0..free.len() {
        let Some(room) = free.get(vehicle).copied() else {
            continue;
        };
        if room < demand || tried.contains(&room) {
            continue;
        }
        tried.push(room);
        if let Some(slot) = free.get_mut(vehicle) {
            *slot = room - demand;
        }
        assignment.push(vehicle);
        if place(instance, rest, free, assignment) {
            return true;
        }
        assignment.pop();
        if let Some(slot) = free.get_mut(vehicle) {
            *slot = room;
        }
    }
    false
}

/// Order one vehicle's stops by repeatedly taking the cheapest arc from the
/// current position, starting at the depot.
fn order_by_cheapest_arc(instance: &Instance, mut stops: Vec<usize>) -> Vec<usize> {
    let arcs = instance.arcs();
    let mut route = Vec::with_capacity(stops.len());
    let mut current = instance.depot();
    while let Some(position) = stops
        .iter()
        .enumerate()
        .min_by(|&(_, &a), &(_, &b)| {
            arcs.cost(current, a)
                .total_cmp(&arcs.cost(current, b))
                .then(a.cmp(&b))
        })
        .map(|(position, _)| position)
    {
        let stop = stops.swap_remove(position);
        route.push(stop);
        current = stop;
    }
    route
}

fn extend_route(
    instance: &Instance,
    vehicle: usize,
    max_route_cost: Option<f64>,
    visited: &mut [bool],
) -> Vec<usize> {
    let arcs = instance.arcs();
    let depot = instance.depot();
    let capacity = instance.capacity(vehicle);
    let mut route = Vec::new();
    let mut current = depot;
    let mut load = 0_u64;
    let mut travelled = 0.0_f64;
    loop {
        let next = instance
            .customers()
            .filter(|&stop| !visited.get(stop).copied().unwrap_or(true))
            .filter(|&stop| load.saturating_add(instance.demand(stop)) <= capacity)
            .filter(|&stop| arcs.is_reachable(current, stop) && arcs.is_reachable(stop, depot))
            .filter(|&stop| {
                max_route_cost.is_none_or(|ceiling| {
                    travelled + arcs.cost(current, stop) + arcs.cost(stop, depot) <= ceiling
                })
            })
            .min_by(|&a, &b| {
                arcs.cost(current, a)
                    .total_cmp(&arcs.cost(current, b))
                    .then(a.cmp(&b))
            });
        let Some(stop) = next else {
            break;
        };
        travelled += arcs.cost(current, stop);
        load = load.saturating_add(instance.demand(stop));
        if let Some(flag) = visited.get_mut(stop) {
            *flag = true;
        }
        route.push(stop);
        current = stop;
    }
    route
}

fn insert_cheapest(instance: &Instance, routes: &mut [Vec<usize>], stop: usize) -> Option<()> {
    let arcs = instance.arcs();
    let depot = instance.depot();
    let demand = instance.demand(stop);
    let mut best: Option<(f64, usize, usize)> = None;
    for (vehicle, route) in routes.iter().enumerate() {
        if instance.load(route).saturating_add(demand) > instance.capacity(vehicle) {
            continue;
        }
        for position in 0..=route.len() {
            let prev = position
                .checked_sub(1)
                .and_then(|p| route.get(p))
                .copied()
                .unwrap_or(depot);
            let next = route.get(position).copied().unwrap_or(depot);
            let delta = arcs.cost(prev, stop) + arcs.cost(stop, next) - arcs.cost(prev, next);
            if best.is_none_or(|(cost, _, _)| delta < cost) {
                best = Some((delta, vehicle, position));
            }
        }
    }
    let (_, vehicle, position) = best?;
    routes.get_mut(vehicle)?.insert(position, stop);
    Some(())
}
