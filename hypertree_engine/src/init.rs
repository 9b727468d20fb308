// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-input initialization: a dataset and its labels, in either order.

use hashbrown::HashMap;
use hypertree_tree::{Generation, SourceNode};

use crate::EngineError;

/// Display labels keyed by [`NodePayload::label_key`](hypertree_tree::NodePayload::label_key).
pub type LabelMap = HashMap<String, String>;

/// Timing metadata reported by a data loader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadTiming {
    /// Host timestamp when loading started.
    pub started_ms: u64,
    /// Host timestamp when the tree was handed over.
    pub finished_ms: u64,
}

impl LoadTiming {
    /// Time spent loading.
    pub fn duration_ms(&self) -> u64 {
        self.finished_ms.saturating_sub(self.started_ms)
    }
}

/// What a data loader delivers.
#[derive(Clone, Debug)]
pub struct LoadedData<D> {
    /// Root of the domain tree.
    pub root: SourceNode<D>,
    /// Load timing.
    pub timing: LoadTiming,
}

/// A callback-style dataset source.
///
/// `load` may call `done` right away or not at all; a load that never
/// completes can still be finished with
/// [`Engine::deliver_data`](crate::Engine::deliver_data).
pub trait DataLoader<D> {
    /// Produce the dataset.
    fn load(&mut self, done: &mut dyn FnMut(LoadedData<D>));
}

/// A callback-style label source.
pub trait LangLoader {
    /// Produce the label map.
    fn load(&mut self, done: &mut dyn FnMut(LabelMap));
}

impl<D, F: FnMut() -> LoadedData<D>> DataLoader<D> for F {
    fn load(&mut self, done: &mut dyn FnMut(LoadedData<D>)) {
        done(self());
    }
}

/// A fixed label map.
impl LangLoader for LabelMap {
    fn load(&mut self, done: &mut dyn FnMut(LabelMap)) {
        done(self.clone());
    }
}

/// Where initialization stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InitState {
    /// No dataset yet (labels may already be buffered).
    #[default]
    Uninitialized,
    /// The dataset arrived; labels are pending.
    DataLoaded,
    /// Both inputs arrived; the first layout is pending.
    LangLoaded,
    /// Laid out and interactive.
    Ready,
}

/// Both inputs of one load.
#[derive(Debug)]
pub(crate) struct CompletedLoad<D> {
    pub(crate) generation: Generation,
    pub(crate) data: LoadedData<D>,
    pub(crate) labels: LabelMap,
}

#[derive(Debug)]
struct PendingLoad<D> {
    generation: Generation,
    data: Option<LoadedData<D>>,
    labels: Option<LabelMap>,
}

/// Tracks the load in flight; at most one at a time.
#[derive(Debug)]
pub(crate) struct InitMachine<D> {
    state: InitState,
    pending: Option<PendingLoad<D>>,
    last_generation: Generation,
}

impl<D> Default for InitMachine<D> {
    fn default() -> Self {
        Self {
            state: InitState::Uninitialized,
            pending: None,
            last_generation: Generation::default(),
        }
    }
}

impl<D> InitMachine<D> {
    pub(crate) fn state(&self) -> InitState {
        self.state
    }

    pub(crate) fn pending_generation(&self) -> Option<Generation> {
        self.pending.as_ref().map(|p| p.generation)
    }

    /// Start a load, superseding any pending one.
    pub(crate) fn begin(&mut self) -> Generation {
        if let Some(old) = self.pending.take() {
            log::debug!("load {:?} superseded", old.generation);
        }
        self.last_generation = self.last_generation.next();
        self.pending = Some(PendingLoad {
            generation: self.last_generation,
            data: None,
            labels: None,
        });
        if self.state != InitState::Ready {
            self.state = InitState::Uninitialized;
        }
        self.last_generation
    }

    pub(crate) fn deliver_data(
        &mut self,
        generation: Generation,
        data: LoadedData<D>,
    ) -> Result<Option<CompletedLoad<D>>, EngineError> {
        let pending = self.pending_for(generation)?;
        pending.data = Some(data);
        if self.state != InitState::Ready {
            self.state = InitState::DataLoaded;
        }
        Ok(self.try_complete())
    }

    pub(crate) fn deliver_labels(
        &mut self,
        generation: Generation,
        labels: LabelMap,
    ) -> Result<Option<CompletedLoad<D>>, EngineError> {
        let pending = self.pending_for(generation)?;
        pending.labels = Some(labels);
        Ok(self.try_complete())
    }

    pub(crate) fn mark_ready(&mut self) {
        self.state = InitState::Ready;
    }

    fn pending_for(&mut self, generation: Generation) -> Result<&mut PendingLoad<D>, EngineError> {
        let expected = self.pending_generation();
        match &mut self.pending {
            Some(p) if p.generation == generation => Ok(p),
            _ => {
                log::warn!("stale delivery for {generation:?}, expecting {expected:?}");
                Err(EngineError::Stale {
                    expected,
                    got: generation,
                })
            }
        }
    }

    fn try_complete(&mut self) -> Option<CompletedLoad<D>> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|p| p.data.is_some() && p.labels.is_some());
        if !ready {
            return None;
        }
        let PendingLoad {
            generation,
            data: Some(data),
            labels: Some(labels),
        } = self.pending.take()?
        else {
            return None;
        };
        if self.state != InitState::Ready {
            self.state = InitState::LangLoaded;
        }
        Some(CompletedLoad {
            generation,
            data,
            labels,
        })
    }
}
