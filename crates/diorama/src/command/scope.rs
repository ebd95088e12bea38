//! The capability handed to `pre_execute` and `post_execute` hooks.

use indexmap::IndexSet;
use log::{debug, trace};

use diorama_core::{identifier::Id, model::Diagram};

use crate::{
    DioramaError,
    services::{BoundsComputer, Layouter, Rules, Services},
};

use super::{
    CommandHandler,
    event::{CommandEvent, Listener, Phase},
    record::{Action, Record},
};

/// Which half of the lifecycle a hook belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// `pre_execute`/`execute`: nested commands execute now and their
    /// `post_execute` is deferred.
    Prepare,
    /// `post_execute`: nested commands run their whole lifecycle at once.
    Finish,
}

/// Read access to the diagram and services, plus the ability to issue
/// nested commands.
///
/// A scope records every command issued through it into the ledger record
/// of the running top-level command.
pub struct Scope<'a> {
    diagram: &'a mut Diagram,
    services: &'a Services,
    listeners: &'a mut [Listener],
    record: Record,
    post_queue: Vec<usize>,
    changed: IndexSet<Id>,
    current: Option<usize>,
    stage: Stage,
}

impl<'a> Scope<'a> {
    pub(super) fn new(
        diagram: &'a mut Diagram,
        services: &'a Services,
        listeners: &'a mut [Listener],
    ) -> Self {
        Self {
            diagram,
            services,
            listeners,
            record: Record::default(),
            post_queue: Vec::new(),
            changed: IndexSet::new(),
            current: None,
            stage: Stage::Finish,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        self.diagram
    }

    pub fn rules(&self) -> &dyn Rules {
        self.services.rules()
    }

    pub fn layouter(&self) -> &dyn Layouter {
        self.services.layouter()
    }

    pub fn bounds_computer(&self) -> &dyn BoundsComputer {
        self.services.bounds_computer()
    }

    /// Issues a nested command on behalf of the running hook.
    ///
    /// From `pre_execute` the command is opened and executed before this
    /// returns, and its `post_execute` joins the deferred queue. From
    /// `post_execute` the command runs its complete lifecycle before this
    /// returns.
    pub fn execute(&mut self, handler: impl CommandHandler + 'static) -> Result<(), DioramaError> {
        let handler: Box<dyn CommandHandler> = Box::new(handler);
        match self.stage {
            Stage::Prepare => self.open(handler, self.current),
            Stage::Finish => self.run_tree(handler, self.current),
        }
    }

    /// Opens `handler` and then drains the `post_execute` hooks queued since.
    pub(super) fn run_tree(
        &mut self,
        handler: Box<dyn CommandHandler>,
        parent: Option<usize>,
    ) -> Result<(), DioramaError> {
        let mark = self.post_queue.len();
        self.open(handler, parent)?;
        while self.post_queue.len() > mark {
            if let Some(index) = self.post_queue.pop() {
                self.finish(index)?;
            }
        }
        Ok(())
    }

    /// Consumes the scope, returning the record and every changed element.
    pub(super) fn into_parts(self) -> (Record, Vec<Id>) {
        (self.record, self.changed.into_iter().collect())
    }

    fn open(
        &mut self,
        handler: Box<dyn CommandHandler>,
        parent: Option<usize>,
    ) -> Result<(), DioramaError> {
        let index = self.record.actions.len();
        let depth = parent.map_or(0, |parent| self.record.actions[parent].depth + 1);
        let command = handler.name();
        debug!(command, depth; "Opening command");

        self.record.actions.push(Action {
            name: command,
            targets: handler.targets(),
            parent,
            depth,
            handler: Some(handler),
        });
        self.post_queue.push(index);

        self.emit(index, Phase::PreExecute, &[]);
        self.with_handler(index, Stage::Prepare, |handler, scope| {
            handler.pre_execute(scope)
        })?;

        let changed = self.with_handler(index, Stage::Prepare, |handler, scope| {
            handler.execute(&mut *scope.diagram)
        })?;
        self.record.executed.push(index);
        trace!(command, changed = changed.len(); "Command executed");

        self.emit(index, Phase::Executed, &changed);
        self.changed.extend(changed);
        Ok(())
    }

    fn finish(&mut self, index: usize) -> Result<(), DioramaError> {
        self.with_handler(index, Stage::Finish, |handler, scope| {
            handler.post_execute(scope)
        })?;
        trace!(command = self.record.actions[index].name; "Command post-executed");
        self.emit(index, Phase::PostExecuted, &[]);
        Ok(())
    }

    /// Runs `f` with the handler at `index` taken out of the record, so the
    /// handler can borrow the scope mutably.
    fn with_handler<T>(
        &mut self,
        index: usize,
        stage: Stage,
        f: impl FnOnce(&mut dyn CommandHandler, &mut Self) -> Result<T, DioramaError>,
    ) -> Result<T, DioramaError> {
        let mut handler = self.record.actions[index].handler.take().ok_or_else(|| {
            DioramaError::invalid_request(format!(
                "command `{}` re-entered its own hook",
                self.record.actions[index].name
            ))
        })?;

        let saved = (self.current, self.stage);
        self.current = Some(index);
        self.stage = stage;
        let result = f(handler.as_mut(), self);
        (self.current, self.stage) = saved;

        self.record.actions[index].handler = Some(handler);
        result
    }

    fn emit(&mut self, index: usize, phase: Phase, changed: &[Id]) {
        let action = &self.record.actions[index];
        let event = CommandEvent {
            command: action.name,
            phase,
            targets: &action.targets,
            changed,
        };
        for listener in self.listeners.iter_mut() {
            listener(&event, &mut *self.diagram);
        }
    }
}
