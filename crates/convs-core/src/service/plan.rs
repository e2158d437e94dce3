//! Save planning for bot modules.
//!
//! Deciding what a submit must do is kept apart from doing it:
//! [`plan_module_save`] is a pure function from (mode, original, module) to
//! an ordered list of [`ModuleEffect`]s, which the module service then
//! executes one by one.

use serde::{Deserialize, Serialize};

use convs_types::bot::BotId;
use convs_types::module::{BotModule, BotModuleId};

/// Whether a submit creates a new module or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleMutation {
    Create,
    Update,
}

/// One step of a module save, executed in plan order.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleEffect {
    /// Persist a new module record.
    Create(BotModule),
    /// Persist an existing module record.
    Update(BotModule),
    /// Remove `module` from `bot`'s module list.
    Detach { bot: BotId, module: BotModuleId },
    /// Add `module` to `bot`'s module list.
    Attach { bot: BotId, module: BotModuleId },
}

/// Plan the effects of saving `module`.
///
/// - Create: persist, then attach to the chosen parent.
/// - Update with the parent unchanged: persist only.
/// - Update with a new parent: persist, detach from the old parent, attach
///   to the new one.
/// - Update without a known original: persist, then attach. Attaching is
///   idempotent so an already-listed id is left alone.
pub fn plan_module_save(
    mode: ModuleMutation,
    original: Option<&BotModule>,
    module: &BotModule,
) -> Vec<ModuleEffect> {
    let attach = ModuleEffect::Attach {
        bot: module.parent_bot.clone(),
        module: module.id.clone(),
    };

    match mode {
        ModuleMutation::Create => vec![ModuleEffect::Create(module.clone()), attach],
        ModuleMutation::Update => {
            let mut effects = vec![ModuleEffect::Update(module.clone())];
            match original.map(|o| &o.parent_bot) {
                Some(old) if old == &module.parent_bot => {}
                Some(old) => {
                    effects.push(ModuleEffect::Detach {
                        bot: old.clone(),
                        module: module.id.clone(),
                    });
                    effects.push(attach);
                }
                None => effects.push(attach),
            }
            effects
        }
    }
}

/// The parent a module is leaving, if the plan re-parents it.
pub fn detached_parent(effects: &[ModuleEffect]) -> Option<&BotId> {
    effects.iter().find_map(|e| match e {
        ModuleEffect::Detach { bot, .. } => Some(bot),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use convs_types::module::ModuleKind;

    fn module(parent: &BotId) -> BotModule {
        BotModule {
            id: BotModuleId::new(),
            name: "Onboarding".to_string(),
            description: String::new(),
            stories: Vec::new(),
            parent_bot: parent.clone(),
            kind: ModuleKind::BotModule,
        }
    }

    #[test]
    fn create_persists_then_attaches() {
        let parent = BotId::new();
        let m = module(&parent);

        let plan = plan_module_save(ModuleMutation::Create, None, &m);

        assert_eq!(
            plan,
            vec![
                ModuleEffect::Create(m.clone()),
                ModuleEffect::Attach {
                    bot: parent,
                    module: m.id.clone()
                },
            ]
        );
        assert!(detached_parent(&plan).is_none());
    }

    #[test]
    fn update_with_same_parent_only_persists() {
        let parent = BotId::new();
        let original = module(&parent);
        let mut edited = original.clone();
        edited.name = "Renamed".to_string();

        let plan = plan_module_save(ModuleMutation::Update, Some(&original), &edited);

        assert_eq!(plan, vec![ModuleEffect::Update(edited)]);
    }

    #[test]
    fn update_with_new_parent_detaches_before_attaching() {
        let old = BotId::new();
        let new = BotId::new();
        let original = module(&old);
        let mut moved = original.clone();
        moved.parent_bot = new.clone();

        let plan = plan_module_save(ModuleMutation::Update, Some(&original), &moved);

        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0], ModuleEffect::Update(moved.clone()));
        assert_eq!(
            plan[1],
            ModuleEffect::Detach {
                bot: old.clone(),
                module: moved.id.clone()
            }
        );
        assert_eq!(
            plan[2],
            ModuleEffect::Attach {
                bot: new,
                module: moved.id.clone()
            }
        );
        assert_eq!(detached_parent(&plan), Some(&old));
    }

    #[test]
    fn update_without_original_attaches_to_current_parent() {
        let parent = BotId::new();
        let m = module(&parent);

        let plan = plan_module_save(ModuleMutation::Update, None, &m);

        assert_eq!(plan.len(), 2);
        assert!(matches!(&plan[1], ModuleEffect::Attach { bot, .. } if bot == &parent));
    }
}
