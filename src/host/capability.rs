//! Host side of the `AntOs` capability
//!
//! Each ant gets an [`AntBody`] that its capability object points at. The
//! body only holds `Cell`s, so the agent calling back into the host while the
//! host is reading the body never needs a mutable borrow.

use std::cell::Cell;
use std::ffi::c_void;
use std::rc::Rc;

use crate::agent::abi::{AgentHandle, AntOs, AntOsVTable, Sugar};
use crate::pipeline::AgentConstructor;

/// Load an ant can carry.
pub const CARRY_CAPACITY: u32 = 1;

/// Sugar piles shared by a colony.
#[derive(Debug)]
pub struct SugarField {
    piles: Vec<Cell<u32>>,
}

impl SugarField {
    pub fn new(piles: u32, amount_per_pile: u32) -> Self {
        Self {
            piles: (0..piles).map(|_| Cell::new(amount_per_pile)).collect(),
        }
    }

    pub fn pile_count(&self) -> u32 {
        self.piles.len() as u32
    }

    pub fn remaining(&self) -> u64 {
        self.piles.iter().map(|pile| u64::from(pile.get())).sum()
    }

    /// The pile an ant notices on `tick`, rotating through the non-empty ones.
    pub fn visible(&self, tick: u32) -> Option<Sugar> {
        let count = self.piles.len();
        if count == 0 {
            return None;
        }
        (0..count)
            .map(|offset| (tick as usize + offset) % count)
            .find(|&index| self.piles[index].get() > 0)
            .map(|index| Sugar {
                id: index as u64,
                amount: self.piles[index].get(),
            })
    }

    fn take(&self, sugar: Sugar, amount: u32) -> u32 {
        match self.piles.get(sugar.id as usize) {
            Some(pile) => {
                let taken = pile.get().min(amount);
                pile.set(pile.get() - taken);
                taken
            }
            None => 0,
        }
    }
}

/// Host-owned state behind one ant's capability object.
#[derive(Debug)]
pub struct AntBody {
    field: Rc<SugarField>,
    rotation: Cell<u64>,
    distance: Cell<i64>,
    turns: Cell<u64>,
    load: Cell<u32>,
    target: Cell<Option<Sugar>>,
    delivered: Cell<u32>,
}

impl AntBody {
    pub fn new(field: Rc<SugarField>) -> Self {
        Self {
            field,
            rotation: Cell::new(0),
            distance: Cell::new(0),
            turns: Cell::new(0),
            load: Cell::new(0),
            target: Cell::new(None),
            delivered: Cell::new(0),
        }
    }

    /// Total degrees turned, in either direction.
    pub fn rotation(&self) -> u64 {
        self.rotation.get()
    }

    pub fn distance(&self) -> i64 {
        self.distance.get()
    }

    pub fn turns(&self) -> u64 {
        self.turns.get()
    }

    pub fn load(&self) -> u32 {
        self.load.get()
    }

    pub fn delivered(&self) -> u32 {
        self.delivered.get()
    }

    /// Clear and return the pile the ant was heading to.
    pub fn take_target(&self) -> Option<Sugar> {
        self.target.take()
    }
}

static BODY_VTABLE: AntOsVTable = AntOsVTable {
    turn: body_turn,
    go_forward: body_go_forward,
    go_to_sugar: body_go_to_sugar,
    take_sugar: body_take_sugar,
    go_to_ant_hill: body_go_to_ant_hill,
    current_load: body_current_load,
};

fn body<'a>(ctx: *mut c_void) -> &'a AntBody {
    // SAFETY: `ctx` always comes from `Colonist::spawn`, which keeps the body
    // alive for longer than the agent holding the capability.
    unsafe { &*ctx.cast::<AntBody>() }
}

extern "C" fn body_turn(ctx: *mut c_void, degrees: i32) {
    let body = body(ctx);
    body.rotation.set(body.rotation.get().saturating_add(u64::from(degrees.unsigned_abs())));
    body.turns.set(body.turns.get().saturating_add(1));
}

extern "C" fn body_go_forward(ctx: *mut c_void, steps: i32) {
    let body = body(ctx);
    body.distance.set(body.distance.get().saturating_add(i64::from(steps.max(0))));
}

extern "C" fn body_go_to_sugar(ctx: *mut c_void, sugar: Sugar) {
    body(ctx).target.set(Some(sugar));
}

extern "C" fn body_take_sugar(ctx: *mut c_void, sugar: Sugar) -> bool {
    let body = body(ctx);
    if body.load.get() > 0 {
        return false;
    }
    let taken = body.field.take(sugar, CARRY_CAPACITY);
    body.load.set(taken);
    taken > 0
}

extern "C" fn body_go_to_ant_hill(ctx: *mut c_void) {
    let body = body(ctx);
    body.delivered.set(body.delivered.get().saturating_add(body.load.replace(0)));
}

extern "C" fn body_current_load(ctx: *mut c_void) -> u32 {
    body(ctx).load.get()
}

/// One constructed agent together with the body its capability points at.
pub struct Colonist {
    // Dropped before `body`, so the agent never outlives what it points at.
    agent: AgentHandle,
    body: Rc<AntBody>,
}

impl Colonist {
    pub fn spawn(constructor: &AgentConstructor, field: Rc<SugarField>) -> Self {
        let body = Rc::new(AntBody::new(field));
        // SAFETY: the Rc allocation never moves and is held by the colonist
        // for as long as the agent exists.
        let os = unsafe { AntOs::from_raw(Rc::as_ptr(&body).cast_mut().cast(), &BODY_VTABLE) };
        let agent = constructor.construct(os);
        Self { agent, body }
    }

    pub fn agent(&mut self) -> &mut AgentHandle {
        &mut self.agent
    }

    pub fn body(&self) -> &AntBody {
        &self.body
    }
}
