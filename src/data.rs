use std::sync::{Arc, Mutex};

use crate::tasks::store::TaskStore;

pub type SharedStore = Arc<Mutex<TaskStore>>;
