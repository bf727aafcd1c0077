use std::ops::Deref;

use tilepath_core::Point;

/// A found route: waypoints from the step after the start up to and
/// including the goal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    waypoints: Vec<Point>,
    costs: Vec<f32>,
}

impl Route {
    /// Build a route from parallel waypoint and accumulated-cost lists.
    pub(crate) fn new(waypoints: Vec<Point>, costs: Vec<f32>) -> Self {
        debug_assert_eq!(waypoints.len(), costs.len());
        Self { waypoints, costs }
    }

    #[inline]
    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    #[inline]
    pub fn into_waypoints(self) -> Vec<Point> {
        self.waypoints
    }

    /// Accumulated move cost at each waypoint.
    #[inline]
    pub fn costs(&self) -> &[f32] {
        &self.costs
    }

    /// Total cost of the route, i.e. the goal's move cost.
    #[inline]
    pub fn cost(&self) -> f32 {
        self.costs.last().copied().unwrap_or(0.0)
    }

    /// The last waypoint.
    #[inline]
    pub fn goal(&self) -> Option<Point> {
        self.waypoints.last().copied()
    }
}

impl Deref for Route {
    type Target = [Point];

    #[inline]
    fn deref(&self) -> &[Point] {
        &self.waypoints
    }
}

impl<'a> IntoIterator for &'a Route {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.waypoints.iter()
    }
}

impl From<Route> for Vec<Point> {
    fn from(route: Route) -> Self {
        route.waypoints
    }
}
