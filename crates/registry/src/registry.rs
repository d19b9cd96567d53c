//! The name-to-definition action catalog.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::instance::{ActionInstance, FreeFn, InteractiveHooks, RunFn};

/// Index of a definition in the catalog. Stable for the lifetime of the
/// registry: definitions are never removed individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefId(pub(crate) usize);

/// Setup hook for a one-shot action: turns an optional config payload
/// into the instance's private option state.
pub type PlainSetupFn = fn(Option<&dyn Any>) -> Box<dyn Any>;

/// Setup hook for an interactive action. Also fills in the lifecycle
/// hooks the instance will use while its session is live.
pub type InteractiveSetupFn = fn(Option<&dyn Any>, &mut InteractiveHooks) -> Box<dyn Any>;

pub type ShutdownFn = fn();

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
	#[error("action name already registered: {0}")]
	Duplicate(String),
	#[error("no such action: {0}")]
	UnknownAction(String),
}

enum SetupHook {
	Plain(Option<PlainSetupFn>),
	Interactive(Option<InteractiveSetupFn>),
}

struct ActionDefinition {
	name: String,
	setup: SetupHook,
	run: RunFn,
	free: Option<FreeFn>,
	shutdown: Option<ShutdownFn>,
	modifies_focus: bool,
	can_stop: bool,
}

/// Global catalog of action definitions, keyed by name.
///
/// Definitions survive reconfiguration; only a true shutdown runs the
/// per-definition shutdown hooks and empties the catalog.
#[derive(Default)]
pub struct ActionRegistry {
	defs: Vec<ActionDefinition>,
	names: FxHashMap<String, DefId>,
}

impl ActionRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Idempotent across reconfiguration: the catalog built at cold
	/// start survives until a true shutdown.
	pub fn startup(&mut self, reconfig: bool) {
		if reconfig {
			return;
		}
		debug!(definitions = self.defs.len(), "action registry starting");
	}

	pub fn shutdown(&mut self, reconfig: bool) {
		if reconfig {
			return;
		}
		for def in self.defs.drain(..) {
			if let Some(shutdown) = def.shutdown {
				shutdown();
			}
		}
		self.names.clear();
	}

	/// Register a one-shot action.
	pub fn register(
		&mut self,
		name: &str,
		setup: Option<PlainSetupFn>,
		free: Option<FreeFn>,
		run: RunFn,
	) -> Result<DefId, RegistryError> {
		self.insert(name, SetupHook::Plain(setup), free, run)
	}

	/// Register an action whose instances may drive interactive sessions.
	pub fn register_interactive(
		&mut self,
		name: &str,
		setup: Option<InteractiveSetupFn>,
		free: Option<FreeFn>,
		run: RunFn,
	) -> Result<DefId, RegistryError> {
		self.insert(name, SetupHook::Interactive(setup), free, run)
	}

	fn insert(
		&mut self,
		name: &str,
		setup: SetupHook,
		free: Option<FreeFn>,
		run: RunFn,
	) -> Result<DefId, RegistryError> {
		if self.names.contains_key(name) {
			return Err(RegistryError::Duplicate(name.to_owned()));
		}
		let id = DefId(self.defs.len());
		self.defs.push(ActionDefinition {
			name: name.to_owned(),
			setup,
			run,
			free,
			shutdown: None,
			modifies_focus: true,
			can_stop: false,
		});
		self.names.insert(name.to_owned(), id);
		Ok(id)
	}

	pub fn set_shutdown(&mut self, name: &str, shutdown: ShutdownFn) -> Result<(), RegistryError> {
		self.def_mut(name)?.shutdown = Some(shutdown);
		Ok(())
	}

	/// Whether running this action counts as the user acting on the
	/// focused window. Defaults to true.
	pub fn set_modifies_focus(&mut self, name: &str, yes: bool) -> Result<(), RegistryError> {
		self.def_mut(name)?.modifies_focus = yes;
		Ok(())
	}

	/// Permit the run hook to report an in-progress result without the
	/// instance being interactive. Defaults to false.
	pub fn set_can_stop(&mut self, name: &str, yes: bool) -> Result<(), RegistryError> {
		self.def_mut(name)?.can_stop = yes;
		Ok(())
	}

	pub fn lookup(&self, name: &str) -> Option<DefId> {
		self.names.get(name).copied()
	}

	/// Instantiate an action straight from its defaults, skipping the
	/// setup hook. Used for bindings synthesized by the window manager
	/// itself rather than read from configuration.
	pub fn build_instance(&self, name: &str) -> Result<Rc<ActionInstance>, RegistryError> {
		let id = self.resolve(name)?;
		let def = &self.defs[id.0];
		Ok(Rc::new(ActionInstance {
			def: id,
			run: def.run,
			hooks: InteractiveHooks::default(),
			options: RefCell::new(Box::new(())),
			free: def.free,
		}))
	}

	/// Instantiate an action from a configuration payload. The setup
	/// hook interprets the payload and, for interactive actions, fills
	/// in the lifecycle hooks.
	pub fn parse_instance(
		&self,
		name: &str,
		payload: Option<&dyn Any>,
	) -> Result<Rc<ActionInstance>, RegistryError> {
		let id = self.resolve(name)?;
		let def = &self.defs[id.0];
		let mut hooks = InteractiveHooks::default();
		let options: Box<dyn Any> = match def.setup {
			SetupHook::Plain(Some(setup)) => setup(payload),
			SetupHook::Interactive(Some(setup)) => setup(payload, &mut hooks),
			SetupHook::Plain(None) | SetupHook::Interactive(None) => Box::new(()),
		};
		Ok(Rc::new(ActionInstance {
			def: id,
			run: def.run,
			hooks,
			options: RefCell::new(options),
			free: def.free,
		}))
	}

	pub(crate) fn name(&self, id: DefId) -> &str {
		&self.defs[id.0].name
	}

	pub(crate) fn modifies_focus(&self, id: DefId) -> bool {
		self.defs[id.0].modifies_focus
	}

	pub(crate) fn can_stop(&self, id: DefId) -> bool {
		self.defs[id.0].can_stop
	}

	fn resolve(&self, name: &str) -> Result<DefId, RegistryError> {
		self.lookup(name).ok_or_else(|| {
			warn!(action = name, "unknown action name in configuration");
			RegistryError::UnknownAction(name.to_owned())
		})
	}

	fn def_mut(&mut self, name: &str) -> Result<&mut ActionDefinition, RegistryError> {
		let id = self
			.lookup(name)
			.ok_or_else(|| RegistryError::UnknownAction(name.to_owned()))?;
		Ok(&mut self.defs[id.0])
	}
}
