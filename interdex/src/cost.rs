use crate::helpe::*;

/// Estimates the linear-allocation footprint a class adds to whichever
/// dex holds it. The packer treats this as an opaque cost function.
pub trait CostModel {
    fn linear_alloc(&self, cls: &DexClass) -> Cost;
}

/// Trusts whatever cost upstream attached to each class.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredCost;

impl CostModel for DeclaredCost {
    #[inline(always)]
    fn linear_alloc(&self, cls: &DexClass) -> Cost {
        if cls.is_canary() { 0 } else { cls.cost }
    }
}

/// Total footprint of a group of classes.
#[inline(always)]
pub fn get_total_cost(classes: &[Arc<DexClass>], model: &dyn CostModel) -> Cost {
    classes.iter()
        .fold(0, |sum: Cost, c| sum.saturating_add(model.linear_alloc(c)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn canaries_cost_nothing() {
        let classes: ClassSet = vec![
            Arc::new(DexClass::new("LA;", 3)),
            Arc::new(DexClass::new("Lsecondary/dex01/Canary;", 50)),
            Arc::new(DexClass::new("LB;", 4)),
        ];
        assert_eq!(get_total_cost(&classes, &DeclaredCost), 7);
    }
}
