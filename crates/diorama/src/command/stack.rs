//! The undo/redo ledger.
//!
//! Records live in two `VecDeque`s so the oldest record can be evicted from
//! the front when the history outgrows its configured depth.
//!
//! ```text
//! execute(r3)          undo()             execute(r4)
//! undo: [r1, r2, r3]   undo: [r1, r2]     undo: [r1, r2, r4]
//! redo: []             redo: [r3]         redo: []
//! ```

use std::{collections::VecDeque, fmt};

use indexmap::IndexSet;
use log::{debug, info, warn};

use diorama_core::{identifier::Id, model::Diagram};

use crate::{DioramaError, config::HistoryConfig, services::Services};

use super::{
    CommandHandler, Scope,
    event::{CommandEvent, Listener, Phase},
    record::Record,
};

/// Executes command trees and keeps them for undo and redo.
pub struct CommandStack {
    undo: VecDeque<Record>,
    redo: VecDeque<Record>,
    max_depth: usize,
    listeners: Vec<Listener>,
}

impl fmt::Debug for CommandStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStack")
            .field("undo_depth", &self.undo.len())
            .field("redo_depth", &self.redo.len())
            .field("max_depth", &self.max_depth)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

impl CommandStack {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            max_depth: config.max_depth(),
            listeners: Vec::new(),
        }
    }

    /// Registers a listener for every [`CommandEvent`].
    pub fn add_listener(&mut self, listener: impl FnMut(&CommandEvent<'_>, &mut Diagram) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Runs `handler` through its full lifecycle and records it.
    ///
    /// Returns every element changed by the command tree.
    ///
    /// # Errors
    ///
    /// A failure before anything executed records nothing. A failure after
    /// some command executed leaves the partial tree on the undo ledger, so
    /// [`undo`](Self::undo) restores the prior state.
    pub fn execute(
        &mut self,
        diagram: &mut Diagram,
        services: &Services,
        handler: Box<dyn CommandHandler>,
    ) -> Result<Vec<Id>, DioramaError> {
        let command = handler.name();
        info!(command; "Executing command");

        let mut scope = Scope::new(diagram, services, &mut self.listeners);
        let result = scope.run_tree(handler, None);
        let (record, changed) = scope.into_parts();

        match result {
            Ok(()) => {
                let targets = top_targets(&record);
                self.redo.clear();
                self.push_undo(record);
                self.emit_changed(diagram, command, &targets, &changed);
                Ok(changed)
            }
            Err(err) => {
                if !record.executed.is_empty() {
                    warn!(
                        command,
                        executed = record.executed.len(),
                        err:%;
                        "Command failed after partial execution, keeping it for undo"
                    );
                    self.redo.clear();
                    self.push_undo(record);
                }
                Err(err)
            }
        }
    }

    /// Reverts the most recent record.
    ///
    /// Returns `false` if there was nothing to undo.
    ///
    /// # Errors
    ///
    /// When a revert fails, the commands already reverted are executed
    /// again and the record stays on the undo ledger. It is dropped only if
    /// that re-execution fails too.
    pub fn undo(&mut self, diagram: &mut Diagram) -> Result<bool, DioramaError> {
        let Some(mut record) = self.undo.pop_back() else {
            debug!("Nothing to undo");
            return Ok(false);
        };
        info!(command = record.name(); "Undo");

        let order: Vec<usize> = record.executed.iter().rev().copied().collect();
        let mut changed = IndexSet::new();
        for (done, &index) in order.iter().enumerate() {
            let action = &mut record.actions[index];
            let Some(handler) = action.handler.as_mut() else {
                continue;
            };
            let ids = match handler.revert(diagram) {
                Ok(ids) => ids,
                Err(err) => {
                    warn!(command = action.name, index, err:%; "Revert failed, re-applying reverted commands");
                    match reapply(&mut record, diagram, &order[..done]) {
                        Ok(()) => self.undo.push_back(record),
                        Err(retry) => {
                            warn!(command = record.name(), err:% = retry; "Re-apply failed, dropping record");
                        }
                    }
                    return Err(err);
                }
            };
            debug!(command = action.name, depth = action.depth(); "Command reverted");
            emit(
                &mut self.listeners,
                diagram,
                &CommandEvent {
                    command: action.name,
                    phase: Phase::Reverted,
                    targets: &action.targets,
                    changed: &ids,
                },
            );
            changed.extend(ids);
        }

        let changed: Vec<Id> = changed.into_iter().collect();
        let targets = top_targets(&record);
        self.emit_changed(diagram, record.name(), &targets, &changed);
        self.redo.push_back(record);
        Ok(true)
    }

    /// Re-applies the most recently undone record.
    ///
    /// Returns `false` if there was nothing to redo.
    ///
    /// # Errors
    ///
    /// When an execute fails, the commands already re-executed are reverted
    /// and the record stays on the redo ledger. It is dropped only if that
    /// revert fails too.
    pub fn redo(&mut self, diagram: &mut Diagram) -> Result<bool, DioramaError> {
        let Some(mut record) = self.redo.pop_back() else {
            debug!("Nothing to redo");
            return Ok(false);
        };
        info!(command = record.name(); "Redo");

        let order = record.executed.clone();
        let mut changed = IndexSet::new();
        for (done, &index) in order.iter().enumerate() {
            let action = &mut record.actions[index];
            let Some(handler) = action.handler.as_mut() else {
                continue;
            };
            let ids = match handler.execute(diagram) {
                Ok(ids) => ids,
                Err(err) => {
                    warn!(command = action.name, index, err:%; "Redo failed, reverting re-executed commands");
                    match unapply(&mut record, diagram, &order[..done]) {
                        Ok(()) => self.redo.push_back(record),
                        Err(retry) => {
                            warn!(command = record.name(), err:% = retry; "Revert failed, dropping record");
                        }
                    }
                    return Err(err);
                }
            };
            debug!(command = action.name, depth = action.depth(); "Command re-executed");
            emit(
                &mut self.listeners,
                diagram,
                &CommandEvent {
                    command: action.name,
                    phase: Phase::Executed,
                    targets: &action.targets,
                    changed: &ids,
                },
            );
            changed.extend(ids);
        }

        let changed: Vec<Id> = changed.into_iter().collect();
        let targets = top_targets(&record);
        self.emit_changed(diagram, record.name(), &targets, &changed);
        self.push_undo(record);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Name of the command [`undo`](Self::undo) would revert next.
    pub fn next_undo_name(&self) -> Option<&'static str> {
        self.undo.back().map(Record::name)
    }

    /// Name of the command [`redo`](Self::redo) would re-apply next.
    pub fn next_redo_name(&self) -> Option<&'static str> {
        self.redo.back().map(Record::name)
    }

    /// The undo ledger, oldest record first.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.undo.iter()
    }

    /// Drops both ledgers. Listeners stay registered.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn push_undo(&mut self, record: Record) {
        self.undo.push_back(record);
        while self.undo.len() > self.max_depth {
            if let Some(evicted) = self.undo.pop_front() {
                debug!(command = evicted.name(), max_depth = self.max_depth; "Evicted oldest record");
            }
        }
    }

    fn emit_changed(&mut self, diagram: &mut Diagram, command: &'static str, targets: &[Id], changed: &[Id]) {
        emit(
            &mut self.listeners,
            diagram,
            &CommandEvent {
                command,
                phase: Phase::ElementsChanged,
                targets,
                changed,
            },
        );
    }
}

fn top_targets(record: &Record) -> Vec<Id> {
    record
        .actions()
        .first()
        .map(|action| action.targets().to_vec())
        .unwrap_or_default()
}

/// Executes `reverted` again, last reverted first.
fn reapply(record: &mut Record, diagram: &mut Diagram, reverted: &[usize]) -> Result<(), DioramaError> {
    for &index in reverted.iter().rev() {
        if let Some(handler) = record.actions[index].handler.as_mut() {
            handler.execute(diagram)?;
        }
    }
    Ok(())
}

/// Reverts `executed`, last executed first.
fn unapply(record: &mut Record, diagram: &mut Diagram, executed: &[usize]) -> Result<(), DioramaError> {
    for &index in executed.iter().rev() {
        if let Some(handler) = record.actions[index].handler.as_mut() {
            handler.revert(diagram)?;
        }
    }
    Ok(())
}

fn emit(listeners: &mut [Listener], diagram: &mut Diagram, event: &CommandEvent<'_>) {
    for listener in listeners.iter_mut() {
        listener(event, &mut *diagram);
    }
}
