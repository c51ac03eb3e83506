use crate::config::KeyConfig;

static CMD_GROUP_GENERAL: &str = "-- General --";
static CMD_GROUP_LOGIN: &str = "-- Login --";
static CMD_GROUP_PROJECTS: &str = "-- Projects --";

#[derive(Clone, PartialEq, PartialOrd, Ord, Eq)]
pub struct CommandText {
    pub name: String,
    pub group: &'static str,
    pub hide_help: bool,
}

impl CommandText {
    pub const fn new(name: String, group: &'static str) -> Self {
        Self {
            name,
            group,
            hide_help: false,
        }
    }
}

pub struct CommandInfo {
    pub text: CommandText,
}

impl CommandInfo {
    pub const fn new(text: CommandText) -> Self {
        Self { text }
    }
}

pub fn go_back(key: &KeyConfig) -> CommandText {
    CommandText::new(format!("Go back [{}]", key.esc), CMD_GROUP_GENERAL)
}

pub fn scroll(key: &KeyConfig) -> CommandText {
    CommandText::new(
        format!("Scroll up/down [{},{}]", key.scroll_up, key.scroll_down),
        CMD_GROUP_GENERAL,
    )
}

pub fn scroll_up_down_multiple_lines(key: &KeyConfig) -> CommandText {
    CommandText::new(
        format!(
            "Scroll up/down multiple lines [{},{}]",
            key.scroll_up_multiple_lines, key.scroll_down_multiple_lines,
        ),
        CMD_GROUP_GENERAL,
    )
}

pub fn scroll_to_top_bottom(key: &KeyConfig) -> CommandText {
    CommandText::new(
        format!(
            "Scroll to top/bottom [{},{}]",
            key.scroll_to_top, key.scroll_to_bottom,
        ),
        CMD_GROUP_GENERAL,
    )
}

pub fn help(key: &KeyConfig) -> CommandText {
    CommandText::new(format!("Help [{}]", key.open_help), CMD_GROUP_GENERAL)
}

pub fn exit_pop_up(key: &KeyConfig) -> CommandText {
    CommandText::new(format!("Exit pop up [{}]", key.esc), CMD_GROUP_GENERAL)
}

pub fn quit(key: &KeyConfig) -> CommandText {
    CommandText::new(format!("Quit [{}]", key.quit), CMD_GROUP_GENERAL)
}

pub fn edit_field(key: &KeyConfig) -> CommandText {
    CommandText::new(format!("Edit field [{}]", key.edit_mode), CMD_GROUP_LOGIN)
}

pub fn submit_login(key: &KeyConfig) -> CommandText {
    CommandText::new(format!("Sign in [{}]", key.enter), CMD_GROUP_LOGIN)
}

pub fn toggle_token(key: &KeyConfig) -> CommandText {
    CommandText::new(
        format!("Show/hide API token [{}]", key.toggle_secret),
        CMD_GROUP_LOGIN,
    )
}

pub fn filter(key: &KeyConfig) -> CommandText {
    CommandText::new(
        format!("Search projects [{}]", key.filter),
        CMD_GROUP_PROJECTS,
    )
}

pub fn select_project(key: &KeyConfig) -> CommandText {
    CommandText::new(
        format!("View project details [{}]", key.enter),
        CMD_GROUP_PROJECTS,
    )
}

pub fn retry(key: &KeyConfig) -> CommandText {
    CommandText::new(
        format!("Retry loading projects [{}]", key.retry),
        CMD_GROUP_PROJECTS,
    )
}

pub fn logout(key: &KeyConfig) -> CommandText {
    CommandText::new(format!("Sign out [{}]", key.logout), CMD_GROUP_PROJECTS)
}
