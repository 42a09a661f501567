//! Static menu tree. Loaded once, immutable thereafter.

use crate::actions::ActionId;
use inmo_core::role::Role;

/// Every menu in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuId {
    Main,
    Clientes,
    Propiedades,
    Usuarios,
    Difusion,
}

/// What choosing an option does: exactly one of a submenu transition or an
/// action start.
#[derive(Debug, Clone, Copy)]
pub enum OptionTarget {
    Menu(MenuId),
    Action(ActionId),
}

/// One selectable line in a menu.
#[derive(Debug, Clone, Copy)]
pub struct MenuOption {
    /// The exact string the user must type.
    pub key: &'static str,
    pub label: &'static str,
    pub target: OptionTarget,
    /// Roles allowed to see and use this option; `None` means everyone.
    pub roles: Option<&'static [Role]>,
}

impl MenuOption {
    pub fn allows(&self, role: Role) -> bool {
        match self.roles {
            None => true,
            Some(roles) => roles.contains(&role),
        }
    }
}

/// A menu: title, ordered options, optional footer.
#[derive(Debug, Clone, Copy)]
pub struct MenuDefinition {
    pub id: MenuId,
    pub title: &'static str,
    pub options: &'static [MenuOption],
    pub footer: Option<&'static str>,
}

const GERENCIA: &[Role] = &[Role::Gerente, Role::Supervisor];
const SOLO_GERENTE: &[Role] = &[Role::Gerente];

const MAIN: MenuDefinition = MenuDefinition {
    id: MenuId::Main,
    title: "*Menú principal*",
    options: &[
        MenuOption {
            key: "1",
            label: "Clientes",
            target: OptionTarget::Menu(MenuId::Clientes),
            roles: None,
        },
        MenuOption {
            key: "2",
            label: "Propiedades",
            target: OptionTarget::Menu(MenuId::Propiedades),
            roles: None,
        },
        MenuOption {
            key: "3",
            label: "Usuarios",
            target: OptionTarget::Menu(MenuId::Usuarios),
            roles: Some(GERENCIA),
        },
        MenuOption {
            key: "4",
            label: "Difusión",
            target: OptionTarget::Menu(MenuId::Difusion),
            roles: Some(GERENCIA),
        },
    ],
    footer: Some("Escribe el número de una opción. \"menu\" vuelve al inicio."),
};

const CLIENTES: MenuDefinition = MenuDefinition {
    id: MenuId::Clientes,
    title: "*Clientes*",
    options: &[
        MenuOption {
            key: "1",
            label: "Registrar cliente",
            target: OptionTarget::Action(ActionId::AddClient),
            roles: None,
        },
        MenuOption {
            key: "2",
            label: "Modificar cliente",
            target: OptionTarget::Action(ActionId::ModifyClient),
            roles: None,
        },
        MenuOption {
            key: "3",
            label: "Ver clientes",
            target: OptionTarget::Action(ActionId::ListClients),
            roles: None,
        },
    ],
    footer: Some("\"0\" vuelve al menú principal."),
};

const PROPIEDADES: MenuDefinition = MenuDefinition {
    id: MenuId::Propiedades,
    title: "*Propiedades*",
    options: &[
        MenuOption {
            key: "1",
            label: "Registrar propiedad",
            target: OptionTarget::Action(ActionId::AddProperty),
            roles: None,
        },
        MenuOption {
            key: "2",
            label: "Modificar propiedad",
            target: OptionTarget::Action(ActionId::ModifyProperty),
            roles: None,
        },
        MenuOption {
            key: "3",
            label: "Agregar archivos a una propiedad",
            target: OptionTarget::Action(ActionId::AddPropertyFiles),
            roles: None,
        },
        MenuOption {
            key: "4",
            label: "Ver propiedades",
            target: OptionTarget::Action(ActionId::ListProperties),
            roles: None,
        },
    ],
    footer: Some("\"0\" vuelve al menú principal."),
};

const USUARIOS: MenuDefinition = MenuDefinition {
    id: MenuId::Usuarios,
    title: "*Usuarios*",
    options: &[
        MenuOption {
            key: "1",
            label: "Registrar usuario",
            target: OptionTarget::Action(ActionId::AddUser),
            roles: Some(SOLO_GERENTE),
        },
        MenuOption {
            key: "2",
            label: "Activar / desactivar usuario",
            target: OptionTarget::Action(ActionId::ToggleUser),
            roles: Some(SOLO_GERENTE),
        },
        MenuOption {
            key: "3",
            label: "Ver usuarios",
            target: OptionTarget::Action(ActionId::ListUsers),
            roles: Some(GERENCIA),
        },
    ],
    footer: Some("\"0\" vuelve al menú principal."),
};

const DIFUSION: MenuDefinition = MenuDefinition {
    id: MenuId::Difusion,
    title: "*Difusión*",
    options: &[MenuOption {
        key: "1",
        label: "Enviar difusión",
        target: OptionTarget::Action(ActionId::SendBroadcast),
        roles: Some(GERENCIA),
    }],
    footer: Some("\"0\" vuelve al menú principal."),
};

/// Look up a menu definition.
pub fn menu(id: MenuId) -> &'static MenuDefinition {
    match id {
        MenuId::Main => &MAIN,
        MenuId::Clientes => &CLIENTES,
        MenuId::Propiedades => &PROPIEDADES,
        MenuId::Usuarios => &USUARIOS,
        MenuId::Difusion => &DIFUSION,
    }
}

/// Render a menu for one caller: title, the options their role may see
/// (gated options are omitted, not disabled), optional footer.
pub fn render(def: &MenuDefinition, role: Role, error: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(err) = error {
        out.push_str(err);
        out.push_str("\n\n");
    }
    out.push_str(def.title);
    out.push('\n');
    for opt in def.options.iter().filter(|o| o.allows(role)) {
        out.push('\n');
        out.push_str(opt.key);
        out.push_str(". ");
        out.push_str(opt.label);
    }
    if let Some(footer) = def.footer {
        out.push_str("\n\n");
        out.push_str(footer);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_option_has_one_target() {
        // The sum type makes "both" and "neither" unrepresentable; this pins
        // the catalog shape instead: keys unique and non-empty per menu.
        for id in [
            MenuId::Main,
            MenuId::Clientes,
            MenuId::Propiedades,
            MenuId::Usuarios,
            MenuId::Difusion,
        ] {
            let def = menu(id);
            assert!(!def.options.is_empty());
            let mut keys: Vec<&str> = def.options.iter().map(|o| o.key).collect();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), def.options.len(), "duplicate key in {id:?}");
        }
    }

    #[test]
    fn test_render_omits_gated_options() {
        let rendered = render(menu(MenuId::Main), Role::Agente, None);
        assert!(rendered.contains("1. Clientes"));
        assert!(rendered.contains("2. Propiedades"));
        assert!(!rendered.contains("Usuarios"));
        assert!(!rendered.contains("Difusión"));
    }

    #[test]
    fn test_render_shows_all_for_gerente() {
        let rendered = render(menu(MenuId::Main), Role::Gerente, None);
        assert!(rendered.contains("3. Usuarios"));
        assert!(rendered.contains("4. Difusión"));
    }

    #[test]
    fn test_render_error_line_first() {
        let rendered = render(menu(MenuId::Main), Role::Agente, Some("Opción inválida."));
        assert!(rendered.starts_with("Opción inválida."));
    }

    #[test]
    fn test_no_rendered_menu_lists_forbidden_option() {
        for id in [
            MenuId::Main,
            MenuId::Clientes,
            MenuId::Propiedades,
            MenuId::Usuarios,
            MenuId::Difusion,
        ] {
            let def = menu(id);
            for role in [Role::Gerente, Role::Supervisor, Role::Agente] {
                let rendered = render(def, role, None);
                for opt in def.options {
                    if !opt.allows(role) {
                        assert!(
                            !rendered.contains(opt.label),
                            "{:?} rendered forbidden option {} for {role}",
                            id,
                            opt.label
                        );
                    }
                }
            }
        }
    }
}
