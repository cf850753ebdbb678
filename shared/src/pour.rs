//! The pour simulation: pure, deterministic, no I/O.
//!
//! Scan convention used throughout: containers are addressed bottom-to-top
//! (index 0 = closed bottom), so the "top" of a container is the highest
//! occupied index. All functions here assume the gravity invariant holds on
//! their inputs and preserve it on their outputs.

use crate::container::{Cell, Container};

/// The result of a single pour between two containers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PourOutcome {
    pub source: Container,
    pub target: Container,
    /// True iff at least one cell transferred.
    pub moved: bool,
}

impl PourOutcome {
    fn unchanged(source: &Container, target: &Container) -> Self {
        Self {
            source: source.clone(),
            target: target.clone(),
            moved: false,
        }
    }
}

/// Index of the topmost occupied slot, or `None` if the container is empty.
pub fn top_index(container: &Container) -> Option<usize> {
    container.cells().iter().rposition(|cell| !cell.is_empty())
}

/// Whether a pour from `source` into `target` would transfer anything.
///
/// False if the source is empty or the target full to the brim; true if the
/// target is entirely empty; otherwise true iff the two top colors match.
///
/// Note: a container aliased with itself trivially matches its own top
/// color, so callers must reject `from == to` moves before consulting this.
pub fn can_pour(source: &Container, target: &Container) -> bool {
    let Some(from_top) = top_index(source) else {
        return false;
    };
    if target.is_full() {
        return false;
    }
    let Some(to_top) = top_index(target) else {
        return true;
    };
    source.cell(from_top) == target.cell(to_top)
}

/// Pours the maximal same-colored run from `source`'s top into the free
/// space at `target`'s top, transferring `min(run, available)` cells.
///
/// Safe to call unconditionally: for any pair that fails [`can_pour`] this
/// returns both containers unchanged with `moved == false`.
pub fn pour(source: &Container, target: &Container) -> PourOutcome {
    if !can_pour(source, target) {
        return PourOutcome::unchanged(source, target);
    }
    let Some(from_top) = top_index(source) else {
        return PourOutcome::unchanged(source, target);
    };
    let Some(Cell::Color(color)) = source.cell(from_top) else {
        return PourOutcome::unchanged(source, target);
    };

    // maximal run of the top color
    let mut run = 1;
    while from_top >= run && source.cell(from_top - run) == Some(Cell::Color(color)) {
        run += 1;
    }

    // contiguous free slots at the target's top
    let target_fill = top_index(target).map_or(0, |top| top + 1);
    let avail = target.capacity() - target_fill;
    let take = run.min(avail);

    let mut new_source = source.clone();
    let mut new_target = target.clone();
    for offset in 0..take {
        new_source.cells_mut()[from_top - offset] = Cell::Empty;
        new_target.cells_mut()[target_fill + offset] = Cell::Color(color);
    }

    PourOutcome {
        source: new_source,
        target: new_target,
        moved: take > 0,
    }
}

/// True iff every container holds at most one distinct color.
///
/// Uniform fill is not required: a partially filled single-color container
/// counts as sorted, and fully empty containers always do.
pub fn is_solved(tubes: &[Container]) -> bool {
    tubes.iter().all(|tube| {
        let mut colors = tube.cells().iter().filter_map(|cell| match cell {
            Cell::Color(color) => Some(*color),
            Cell::Empty => None,
        });
        match colors.next() {
            None => true,
            Some(first) => colors.all(|color| color == first),
        }
    })
}
