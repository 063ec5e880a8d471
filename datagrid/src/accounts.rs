//! User accounts screen: a typed row model, its columns and the selection side panel.

use egui::RichText;
use eyre::{Context, Result};
use libdatagrid::config::GridSettings;
use libdatagrid::{
    CellValue, ColumnDef, ColumnKey, DataGrid, FilterKind, GridHandle, GridMessage, GridOptions,
    GridRow, GridSize, GridTheme, RowExpandable, RowKey, RowSelection,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

const SAMPLE_ACCOUNTS: &str = include_str!("../assets/accounts.json");
/// Accounts with this role can not be selected.
const PROTECTED_ROLE: i64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub fname: String,
    pub contact: String,
    pub role: Role,
    #[serde(default)]
    pub usergroups: Vec<UserGroup>,
    pub user_type: String,
    /// Minutes.
    pub time_spent: u64,
    #[serde(default)]
    pub last_login: Option<String>,
    pub status: bool,
}

impl Account {
    #[must_use]
    pub fn key(&self) -> RowKey {
        RowKey::Num(self.id)
    }

    #[must_use]
    pub fn group_names(&self) -> String {
        self.usergroups
            .iter()
            .map(|group| group.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn json_cell(value: &impl Serialize) -> CellValue {
    serde_json::to_value(value).map_or(CellValue::Null, |value| CellValue::from_json(&value))
}

impl GridRow for Account {
    fn field(&self, key: &ColumnKey) -> CellValue {
        match key.as_str() {
            "id" => CellValue::Number(self.id as f64),
            "username" => CellValue::Text(self.username.clone()),
            "email" => CellValue::Text(self.email.clone()),
            "fname" => CellValue::Text(self.fname.clone()),
            "contact" => CellValue::Text(self.contact.clone()),
            "role" => json_cell(&self.role),
            "usergroups" => json_cell(&self.usergroups),
            "user_type" => CellValue::Text(self.user_type.clone()),
            "time_spent" => CellValue::Number(self.time_spent as f64),
            "last_login" => self
                .last_login
                .clone()
                .map_or(CellValue::Null, CellValue::Text),
            "status" => CellValue::Bool(self.status),
            _ => CellValue::Null,
        }
    }
}

pub fn sample_accounts() -> Result<Vec<Account>> {
    serde_json::from_str(SAMPLE_ACCOUNTS).context("Failed to parse the bundled accounts")
}

/// "Hh Mm" from minutes.
#[must_use]
pub fn format_time_spent(minutes: u64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

pub fn account_columns() -> Vec<ColumnDef<Account>> {
    vec![
        ColumnDef::new("username", "Username")
            .sortable()
            .filter(FilterKind::Input),
        ColumnDef::new("fname", "Name")
            .sortable()
            .filter(FilterKind::Input),
        ColumnDef::new("email", "Email").filter(FilterKind::Input),
        ColumnDef::new("contact", "Contact").hidden(),
        ColumnDef::new("role", "Role")
            .sortable()
            .filter(FilterKind::MultiSelect)
            .filter_options(["Admin", "Manager", "Agent"])
            .render(|account: &Account| account.role.name.clone()),
        ColumnDef::new("usergroups", "Groups")
            .filter(FilterKind::MultiSelect)
            .filter_options(["Operations", "Support", "Billing", "Sales"])
            .render(Account::group_names),
        ColumnDef::new("user_type", "Type")
            .filter(FilterKind::SingleSelect)
            .filter_options(["admin", "user"])
            .label_map([("admin", "Admin"), ("user", "User")])
            .render(|account: &Account| {
                if account.user_type == "admin" { "Admin" } else { "User" }
            }),
        ColumnDef::new("time_spent", "Time Spent")
            .sortable()
            .render(|account: &Account| format_time_spent(account.time_spent)),
        ColumnDef::new("last_login", "Last Login")
            .sortable()
            .filter(FilterKind::DateRange),
        ColumnDef::new("status", "Status")
            .sortable()
            .filter(FilterKind::SingleSelect)
            .filter_options(["true", "false"])
            .label_map([("true", "Active"), ("false", "Inactive")])
            .col_class_params(|account: &Account| {
                let class = if account.status { "status-active" } else { "status-inactive" };
                class.to_string()
            })
            .render(|account: &Account| if account.status { "Active" } else { "Inactive" }),
    ]
}

fn draw_detail(ui: &mut egui::Ui, account: &Account) {
    ui.horizontal_wrapped(|ui| {
        ui.label(RichText::new(&account.fname).strong());
        ui.label(format!("<{}>", account.email));
        ui.label(format!("Contact: {}", account.contact));
        ui.label(format!(
            "Last login: {}",
            account.last_login.as_deref().unwrap_or("never")
        ));
        if !account.usergroups.is_empty() {
            ui.label(format!("Groups: {}", account.group_names()));
        }
    });
}

/// Selected account as listed in the side panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedAccount {
    pub key: RowKey,
    pub label: String,
}

pub struct AccountsScreen {
    pub grid: DataGrid<Account>,
    handle: GridHandle,
    selected: Rc<RefCell<Vec<SelectedAccount>>>,
    double_clicked: Rc<RefCell<Option<RowKey>>>,
}

impl AccountsScreen {
    pub fn new(accounts: Vec<Account>, settings: GridSettings, size: Option<GridSize>) -> Self {
        let selected: Rc<RefCell<Vec<SelectedAccount>>> = Rc::default();
        let double_clicked: Rc<RefCell<Option<RowKey>>> = Rc::default();

        let selection_log = Rc::clone(&selected);
        let selection = RowSelection::default()
            .with_row_id(Account::key)
            .with_selectable(|account: &Account| account.role.id != PROTECTED_ROLE)
            .on_select(move |keys, accounts| {
                *selection_log.borrow_mut() = keys
                    .iter()
                    .zip(accounts)
                    .map(|(key, account)| SelectedAccount {
                        key: key.clone(),
                        label: format!("{} ({})", account.fname, account.username),
                    })
                    .collect();
            });
        let click_log = Rc::clone(&double_clicked);

        let options = GridOptions {
            page_size: settings.page_size,
            row_selection: Some(selection),
            row_expandable: Some(RowExpandable::new(draw_detail)),
            row_class: Some(std::sync::Arc::new(|account: &Account| {
                if account.role.id == PROTECTED_ROLE {
                    "protected".to_string()
                } else if !account.status {
                    "muted".to_string()
                } else {
                    String::new()
                }
            })),
            columns_visible_option: true,
            data_export: true,
            theme: Some(GridTheme::Size(size.unwrap_or(GridSize::Sm))),
            on_row_double_click: Some(Box::new(move |account: &Account| {
                *click_log.borrow_mut() = Some(account.key());
            })),
            ..Default::default()
        };

        let grid = DataGrid::with_settings(accounts, account_columns(), options, settings)
            .with_id_salt("accounts");
        Self {
            handle: grid.handle(),
            grid,
            selected,
            double_clicked,
        }
    }

    /// Host reactions that need the grid itself, run after it was drawn.
    pub fn after_frame(&mut self) {
        let clicked = self.double_clicked.borrow_mut().take();
        if let Some(key) = clicked {
            info!("Showing details of account {key}");
            self.grid.update(GridMessage::ToggleRowExpanded(key));
        }
    }

    #[must_use]
    pub fn selected(&self) -> Vec<SelectedAccount> {
        self.selected.borrow().clone()
    }

    pub fn draw_selection_panel(&self, ui: &mut egui::Ui) {
        ui.heading("Selected users");
        ui.separator();

        let selected = self.selected();
        if selected.is_empty() {
            ui.label(RichText::new("No users selected").italics());
            return;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            for account in &selected {
                ui.horizontal(|ui| {
                    if ui.small_button("Remove").clicked() {
                        self.handle.deselect_row(account.key.clone());
                    }
                    ui.label(&account.label);
                });
            }
        });
        ui.separator();
        if ui.button("Clear").clicked() {
            self.handle.clear_selected_rows();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> AccountsScreen {
        AccountsScreen::new(
            sample_accounts().unwrap(),
            GridSettings::default(),
            None,
        )
    }

    #[test]
    fn bundled_accounts_parse() {
        let accounts = sample_accounts().unwrap();

        assert_eq!(accounts.len(), 15);
        assert!(accounts.iter().any(|account| account.role.id == PROTECTED_ROLE));
    }

    #[test]
    fn time_spent_in_hours_and_minutes() {
        assert_eq!(format_time_spent(0), "0h 0m");
        assert_eq!(format_time_spent(845), "14h 5m");
    }

    #[test]
    fn admins_are_not_selectable() {
        let mut screen = screen();

        screen.grid.update(GridMessage::TogglePageSelected(true));

        let selected = screen.selected();
        assert_eq!(selected.len(), 8);
        assert!(
            !selected
                .iter()
                .any(|account| account.key == RowKey::Num(1) || account.key == RowKey::Num(8))
        );
        assert_eq!(selected[0].label, "Mia Brown (mbrown)");
    }

    #[test]
    fn side_panel_actions_go_through_the_handle() {
        let mut screen = screen();
        screen.grid.update(GridMessage::ToggleRowSelected(RowKey::Num(2)));
        screen.grid.update(GridMessage::ToggleRowSelected(RowKey::Num(3)));

        screen.handle.deselect_row(2i64);
        screen.grid.process_pending();
        assert_eq!(screen.selected().len(), 1);

        screen.handle.clear_selected_rows();
        screen.grid.process_pending();
        assert!(screen.selected().is_empty());
    }

    #[test]
    fn double_click_expands_the_row() {
        let mut screen = screen();
        let start = std::time::Instant::now();
        for offset in [0, 100] {
            screen.grid.update(GridMessage::RowClicked {
                key: RowKey::Num(3),
                data_index: 2,
                at: start + std::time::Duration::from_millis(offset),
            });
        }

        screen.after_frame();

        assert!(screen.grid.expansion().is_expanded(&RowKey::Num(3)));
    }

    #[test]
    fn group_filter_finds_members() {
        let mut screen = screen();
        screen.grid.update(GridMessage::SetColumnFilter {
            column: "usergroups".into(),
            value: libdatagrid::FilterValue::Many(["Billing".to_string()].into()),
        });

        let table = screen.grid.export_table();

        assert_eq!(table.row_count(), 4);
        assert!(!table.headers.contains(&"Contact".to_string()));
    }
}
