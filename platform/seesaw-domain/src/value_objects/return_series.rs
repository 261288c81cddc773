use crate::value_objects::month::Month;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnPoint {
    pub month: Month,
    pub value: f64,
}

/// Simple monthly returns of one asset, labelled with the later month of each pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    pub asset: String,
    pub points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }
}
