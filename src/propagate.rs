//! Propagation (spec.md §4.G): left/right-implied fixings derived purely
//! from the branch triple and the reduced-cost fixings the LP solve at
//! this node already produced.

use crate::lp::{BranchConstraint, BranchSide, VarKey};

/// Fixings implied by the left branch (`x_ij = x_jk = x_ik = 0`, all three
/// vertices in one cluster): any existing fixing `x_{i,s}` propagates
/// identically to `x_{j,s}` and `x_{k,s}`.
///
/// Preserves the original's asymmetry verbatim: only fixings whose
/// canonical **first** component equals `i` are inspected — a fixing on
/// `x_{s,i}` with `s < i` is missed even though it is the same pair (spec.md
/// §9 Open Questions: "do not silently fix"). Returns only the *newly*
/// implied fixings; callers fold them into their existing fixed sets.
pub fn left_implied(
    fixed_ones: &[VarKey],
    fixed_zeros: &[VarKey],
    triple: [u32; 3],
) -> (Vec<VarKey>, Vec<VarKey>) {
    let [i, j, k] = triple;
    let mut implied_zeros = Vec::new();
    let mut implied_ones = Vec::new();
    for &VarKey(first, second) in fixed_zeros {
        if first == i {
            implied_zeros.push(VarKey::new(j, second));
            implied_zeros.push(VarKey::new(k, second));
        }
    }
    for &VarKey(first, second) in fixed_ones {
        if first == i {
            implied_ones.push(VarKey::new(j, second));
            implied_ones.push(VarKey::new(k, second));
        }
    }
    (implied_zeros, implied_ones)
}

/// Constraints implied by the right branch (`x_ij + x_jk + x_ik >= 2`): a
/// fixing `x_{i,s} = 0` (i.e. `i` and `s` together) forces at least one
/// split among `{s, j, k}` too, appended as a fresh path constraint. Same
/// first-component-only asymmetry as `left_implied`.
pub fn right_implied(fixed_zeros: &[VarKey], triple: [u32; 3]) -> Vec<BranchConstraint> {
    let [_, j, k] = triple;
    let i = triple[0];
    let mut implied = Vec::new();
    for &VarKey(first, second) in fixed_zeros {
        if first == i {
            let mut t = [second, j, k];
            t.sort_unstable();
            implied.push(BranchConstraint {
                triple: t,
                side: BranchSide::Right,
            });
        }
    }
    implied
}
