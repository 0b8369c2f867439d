// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use num_traits::{PrimInt, Signed};

/// A closed tour through all vertices together with its total cost.
///
/// The route starts and ends at vertex `0`, so a tour over `n` vertices has
/// `n + 1` entries: `[0, v1, ..., v_{n-1}, 0]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tour<T> {
    route: Vec<usize>,
    cost: T,
}

impl<T> Tour<T>
where
    T: PrimInt + Signed,
{
    /// Constructs a new `Tour`.
    ///
    /// # Panics
    ///
    /// Panics if `route` has fewer than two entries or does not start and end
    /// at the same vertex.
    pub fn new(route: Vec<usize>, cost: T) -> Self {
        assert!(
            route.len() >= 2,
            "called `Tour::new` with a route of length {}; a closed route needs at least 2 entries",
            route.len()
        );
        assert_eq!(
            route.first(),
            route.last(),
            "called `Tour::new` with an open route: {:?}",
            route
        );

        Self { route, cost }
    }

    /// Returns the vertex sequence, including the closing return to the start.
    #[inline]
    pub fn route(&self) -> &[usize] {
        &self.route
    }

    /// Returns the total cost.
    #[inline]
    pub fn cost(&self) -> T {
        self.cost
    }

    /// Returns the number of distinct vertices visited.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.route.len() - 1
    }

    /// Returns the traversed edges in order.
    #[inline]
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.route.windows(2).map(|w| (w[0], w[1]))
    }

    /// Consumes the tour and returns its route.
    #[inline]
    pub fn into_route(self) -> Vec<usize> {
        self.route
    }
}

impl<T> std::fmt::Display for Tour<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tour (cost {}): ", self.cost)?;
        for (k, v) in self.route.iter().enumerate() {
            if k > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let tour = Tour::new(vec![0, 2, 1, 0], 9i64);
        assert_eq!(tour.route(), &[0, 2, 1, 0]);
        assert_eq!(tour.cost(), 9);
        assert_eq!(tour.num_vertices(), 3);
        assert_eq!(tour.edges().collect::<Vec<_>>(), vec![(0, 2), (2, 1), (1, 0)]);
    }

    #[test]
    fn test_display() {
        let tour = Tour::new(vec![0, 1, 0], 4i64);
        assert_eq!(tour.to_string(), "Tour (cost 4): 0 -> 1 -> 0");
    }

    #[test]
    #[should_panic(expected = "called `Tour::new` with an open route")]
    fn test_open_route_panics() {
        let _ = Tour::new(vec![0, 1, 2], 0i64);
    }
}
