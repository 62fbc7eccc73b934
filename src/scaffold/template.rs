//! Agent source template

use super::validate::{NameError, validate_agent_name};
use crate::agent::ABI_FILE_NAME;

const NAME_PLACEHOLDER: &str = "{{NAME}}";
const ABI_MODULE_PLACEHOLDER: &str = "{{ABI_MODULE}}";

const AGENT_TEMPLATE: &str = r#"//! {{NAME}}: an ant for the gtm simulation.
//!
//! Build and run it with `gtm run agent.rs`.

mod {{ABI_MODULE}};

use std::sync::atomic::{AtomicU64, Ordering};

use {{ABI_MODULE}}::{AgentDeclaration, AgentHandle, Ant, AntOs, Mark, Sugar};

static HATCHED: AtomicU64 = AtomicU64::new(0);

/// An example ant. It wanders around until it spots sugar, then carries it home.
pub struct {{NAME}} {
    /// The ant's way back into the simulation.
    os: AntOs,
    seed: u64,
}

impl {{NAME}} {
    fn new(os: AntOs) -> Self {
        let hatched = HATCHED.fetch_add(1, Ordering::Relaxed);
        Self {
            os,
            seed: 0x9E37_79B9_7F4A_7C15 ^ hatched.wrapping_mul(0xBF58_476D_1CE4_E5B9),
        }
    }

    /// xorshift64, good enough to pick a direction.
    fn next_random(&mut self) -> u64 {
        let mut x = self.seed;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.seed = x;
        x
    }
}

impl Ant for {{NAME}} {
    /// Nothing to do: turn somewhere random and walk on.
    fn waits(&mut self) {
        let degrees = (self.next_random() % 360) as i32;
        self.os.turn(degrees);
        self.os.go_forward(60);
    }

    fn see_sugar(&mut self, sugar: Sugar) {
        // Already carrying, no need to fetch more.
        if self.os.current_load() > 0 {
            return;
        }
        self.os.go_to_sugar(sugar);
    }

    fn reached_sugar(&mut self, sugar: Sugar) {
        let _ = self.os.take_sugar(sugar);
        self.os.go_to_ant_hill();
    }

    fn see_friend(&mut self) {}

    fn see_mark(&mut self, _mark: Mark) {}

    fn tick(&mut self) {}
}

extern "C" fn new_ant(os: AntOs) -> AgentHandle {
    AgentHandle::new({{NAME}}::new(os))
}

/// Entry point the gtm host looks up after loading this module.
#[unsafe(no_mangle)]
pub static GTM_NEW_AGENT: AgentDeclaration = AgentDeclaration::new(new_ant);
"#;

/// Name of the generated agent source file.
pub const AGENT_FILE_NAME: &str = "agent.rs";

/// Render the agent source for `name`.
pub fn render_agent(name: &str) -> Result<String, NameError> {
    validate_agent_name(name)?;

    let abi_module = ABI_FILE_NAME.trim_end_matches(".rs");
    Ok(AGENT_TEMPLATE
        .replace(ABI_MODULE_PLACEHOLDER, abi_module)
        .replace(NAME_PLACEHOLDER, name))
}
