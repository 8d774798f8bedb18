//! Routes with their resolved geometry.

use std::collections::HashMap;

use crate::models::{RouteGeometry, RouteId};

#[derive(Default)]
pub struct RouteTable {
    routes: Vec<RouteGeometry>,
    by_id: HashMap<RouteId, usize>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteGeometry>) -> Self {
        let mut by_id = HashMap::with_capacity(routes.len());
        for (index, route) in routes.iter().enumerate() {
            by_id.entry(route.id.clone()).or_insert(index);
        }
        Self { routes, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&RouteGeometry> {
        self.by_id.get(id).map(|&index| &self.routes[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteGeometry> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
