//! Plugin ABI shared by the gtm host and compiled ant agents.
//!
//! This file is self-contained on purpose: `gtm init` writes it verbatim next
//! to a new agent as `gtm_abi.rs`, and the agent pulls it in with
//! `mod gtm_abi;`. Both sides therefore compile the exact same layouts.
//! Keep it free of crate paths and third-party dependencies.
//!
//! An agent module exports a single static named [`DECLARATION_SYMBOL`] of type
//! [`AgentDeclaration`]. The host checks its magic tag, ABI version and
//! signature descriptor before it ever calls the constructor.

#![allow(dead_code)]

use std::ffi::{CStr, c_char, c_void};
use std::marker::PhantomData;

/// Name of the static every agent module must export.
pub const DECLARATION_SYMBOL: &str = "GTM_NEW_AGENT";

/// "GTM_AGNT"
pub const DECLARATION_MAGIC: u64 = 0x4754_4d5f_4147_4e54;

/// Bumped whenever a layout in this file changes.
pub const ABI_VERSION: u32 = 1;

/// Shape of the constructor described by an [`AgentDeclaration`].
pub const CONSTRUCTOR_SIGNATURE: &CStr = c"fn(AntOs) -> AgentHandle";

/// The constructor an agent module provides.
pub type AgentConstructorFn = extern "C" fn(AntOs) -> AgentHandle;

/// A sugar pile visible to an ant.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sugar {
    pub id: u64,
    pub amount: u32,
}

/// A mark left behind by another ant.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pub id: u64,
    pub info: i32,
}

/// Function table behind [`AntOs`]. Implemented by the host.
#[repr(C)]
pub struct AntOsVTable {
    pub turn: extern "C" fn(ctx: *mut c_void, degrees: i32),
    pub go_forward: extern "C" fn(ctx: *mut c_void, steps: i32),
    pub go_to_sugar: extern "C" fn(ctx: *mut c_void, sugar: Sugar),
    pub take_sugar: extern "C" fn(ctx: *mut c_void, sugar: Sugar) -> bool,
    pub go_to_ant_hill: extern "C" fn(ctx: *mut c_void),
    pub current_load: extern "C" fn(ctx: *mut c_void) -> u32,
}

/// Capability object handed to an agent constructor.
///
/// Every call goes back into the host, which owns the ant's body.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct AntOs {
    ctx: *mut c_void,
    vtable: &'static AntOsVTable,
}

impl AntOs {
    /// Build a capability from a host context and its function table.
    ///
    /// # Safety
    ///
    /// `ctx` must be the pointer the functions in `vtable` expect, and it must
    /// stay valid for as long as any copy of the returned value is used.
    pub unsafe fn from_raw(ctx: *mut c_void, vtable: &'static AntOsVTable) -> Self {
        Self { ctx, vtable }
    }

    /// Turn by `degrees`; positive is clockwise.
    pub fn turn(&self, degrees: i32) {
        (self.vtable.turn)(self.ctx, degrees)
    }

    pub fn go_forward(&self, steps: i32) {
        (self.vtable.go_forward)(self.ctx, steps)
    }

    pub fn go_to_sugar(&self, sugar: Sugar) {
        (self.vtable.go_to_sugar)(self.ctx, sugar)
    }

    /// Pick up sugar from a pile the ant has reached. Returns false if the
    /// ant is already carrying something or the pile is gone.
    pub fn take_sugar(&self, sugar: Sugar) -> bool {
        (self.vtable.take_sugar)(self.ctx, sugar)
    }

    pub fn go_to_ant_hill(&self) {
        (self.vtable.go_to_ant_hill)(self.ctx)
    }

    pub fn current_load(&self) -> u32 {
        (self.vtable.current_load)(self.ctx)
    }
}

/// Behaviour of an ant. Every callback defaults to doing nothing.
pub trait Ant {
    /// Called when the ant has nothing specific to do.
    fn waits(&mut self) {}

    fn see_sugar(&mut self, _sugar: Sugar) {}

    fn reached_sugar(&mut self, _sugar: Sugar) {}

    fn see_friend(&mut self) {}

    fn see_mark(&mut self, _mark: Mark) {}

    /// Called once per simulation tick.
    fn tick(&mut self) {}
}

/// Function table behind [`AgentHandle`]. Generated per agent type.
#[repr(C)]
pub struct AgentVTable {
    pub waits: extern "C" fn(instance: *mut c_void),
    pub see_sugar: extern "C" fn(instance: *mut c_void, sugar: Sugar),
    pub reached_sugar: extern "C" fn(instance: *mut c_void, sugar: Sugar),
    pub see_friend: extern "C" fn(instance: *mut c_void),
    pub see_mark: extern "C" fn(instance: *mut c_void, mark: Mark),
    pub tick: extern "C" fn(instance: *mut c_void),
    pub drop: extern "C" fn(instance: *mut c_void),
}

/// Opaque handle to an ant living inside an agent module.
///
/// The instance is allocated and freed by the module that created it.
#[repr(C)]
pub struct AgentHandle {
    instance: *mut c_void,
    vtable: &'static AgentVTable,
}

impl AgentHandle {
    pub fn new<A: Ant + 'static>(ant: A) -> Self {
        Self {
            instance: Box::into_raw(Box::new(ant)).cast(),
            vtable: agent_vtable::<A>(),
        }
    }

    pub fn waits(&mut self) {
        (self.vtable.waits)(self.instance)
    }

    pub fn see_sugar(&mut self, sugar: Sugar) {
        (self.vtable.see_sugar)(self.instance, sugar)
    }

    pub fn reached_sugar(&mut self, sugar: Sugar) {
        (self.vtable.reached_sugar)(self.instance, sugar)
    }

    pub fn see_friend(&mut self) {
        (self.vtable.see_friend)(self.instance)
    }

    pub fn see_mark(&mut self, mark: Mark) {
        (self.vtable.see_mark)(self.instance, mark)
    }

    pub fn tick(&mut self) {
        (self.vtable.tick)(self.instance)
    }
}

impl Drop for AgentHandle {
    fn drop(&mut self) {
        (self.vtable.drop)(self.instance)
    }
}

struct VTableFor<A>(PhantomData<A>);

impl<A: Ant + 'static> VTableFor<A> {
    const VTABLE: AgentVTable = AgentVTable {
        waits: ant_waits::<A>,
        see_sugar: ant_see_sugar::<A>,
        reached_sugar: ant_reached_sugar::<A>,
        see_friend: ant_see_friend::<A>,
        see_mark: ant_see_mark::<A>,
        tick: ant_tick::<A>,
        drop: ant_drop::<A>,
    };
}

fn agent_vtable<A: Ant + 'static>() -> &'static AgentVTable {
    &VTableFor::<A>::VTABLE
}

// SAFETY (all thunks below): `instance` was produced by
// `AgentHandle::new::<A>` and is only ever paired with the vtable generated
// for the same `A`.

extern "C" fn ant_waits<A: Ant>(instance: *mut c_void) {
    unsafe { &mut *instance.cast::<A>() }.waits()
}

extern "C" fn ant_see_sugar<A: Ant>(instance: *mut c_void, sugar: Sugar) {
    unsafe { &mut *instance.cast::<A>() }.see_sugar(sugar)
}

extern "C" fn ant_reached_sugar<A: Ant>(instance: *mut c_void, sugar: Sugar) {
    unsafe { &mut *instance.cast::<A>() }.reached_sugar(sugar)
}

extern "C" fn ant_see_friend<A: Ant>(instance: *mut c_void) {
    unsafe { &mut *instance.cast::<A>() }.see_friend()
}

extern "C" fn ant_see_mark<A: Ant>(instance: *mut c_void, mark: Mark) {
    unsafe { &mut *instance.cast::<A>() }.see_mark(mark)
}

extern "C" fn ant_tick<A: Ant>(instance: *mut c_void) {
    unsafe { &mut *instance.cast::<A>() }.tick()
}

// The handle calls this exactly once, from its Drop.
extern "C" fn ant_drop<A>(instance: *mut c_void) {
    drop(unsafe { Box::from_raw(instance.cast::<A>()) })
}

/// The static an agent module exports under [`DECLARATION_SYMBOL`].
///
/// ```ignore
/// #[unsafe(no_mangle)]
/// pub static GTM_NEW_AGENT: AgentDeclaration = AgentDeclaration::new(new_ant);
/// ```
#[repr(C)]
pub struct AgentDeclaration {
    pub magic: u64,
    pub abi_version: u32,
    pub signature: *const c_char,
    pub constructor: AgentConstructorFn,
}

// SAFETY: the declaration is immutable and `signature` points at a 'static C string.
unsafe impl Sync for AgentDeclaration {}

impl AgentDeclaration {
    pub const fn new(constructor: AgentConstructorFn) -> Self {
        Self {
            magic: DECLARATION_MAGIC,
            abi_version: ABI_VERSION,
            signature: CONSTRUCTOR_SIGNATURE.as_ptr(),
            constructor,
        }
    }
}
