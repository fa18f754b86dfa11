//! GroupBot: named groups of users per chat, mentioned at once through their alias.

use std::sync::Arc;

use async_trait::async_trait;
use multibot_core::{ChatType, Handler, Message, Response, User};
use storage::{unique, GroupStore};
use tracing::{info, warn};

use crate::text::{escape_underscores, find_aliases, remove_users_pings, with_alias_prefix, ALIAS_PREFIX};

/// Alias that mentions every member of the chat when a [`ChatMembers`] source is configured.
const ALL_ALIAS: &str = "@all";

const HELP: &str = r"Groups bot - gathers usernames into one mention, like @admins
/add\_group @group\_alias @user1 @user2 ... - adds a group with the given users
/delete\_user\_from\_group @group\_alias @user - removes user from the group
/delete\_group @group\_alias - removes group
/list\_groups - shows the list of existing groups
/add\_user\_to\_group @group\_alias @user - adds user to the specified group
@group\_alias - triggers bot to send message with all participants of the group
";

/// Lists the members of a chat, used to answer `@all`.
#[async_trait]
pub trait ChatMembers: Send + Sync {
    async fn members(&self, chat_id: i64) -> multibot_core::Result<Vec<User>>;
}

/// Everything GroupBot needs to work.
#[derive(Clone)]
pub struct GroupBotParams {
    pub store: Arc<dyn GroupStore>,
    /// Answer malformed, unauthorized and failed commands instead of staying silent.
    pub respond_all_commands: bool,
    pub chat_members: Option<Arc<dyn ChatMembers>>,
}

/// Gathers usernames into one mention, like @admins.
pub struct GroupBot {
    params: GroupBotParams,
}

impl GroupBot {
    pub fn new(params: GroupBotParams) -> Self {
        info!(
            respond_all_commands = params.respond_all_commands,
            chat_members = params.chat_members.is_some(),
            "GroupBot instantiated"
        );
        Self { params }
    }

    /// Replies only when configured to answer every command.
    fn chatty(&self, text: &str) -> Option<Response> {
        self.params
            .respond_all_commands
            .then(|| Response::reply(text))
    }

    fn illegal_access(&self) -> Option<Response> {
        self.chatty("You don't have admin rights to execute this command")
    }

    fn internal_error(&self) -> Option<Response> {
        self.chatty("Internal error")
    }

    /// `/add_group @alias @user1 @user2 ...`
    async fn add_group(&self, message: &Message, args: &[&str]) -> Option<Response> {
        if args.len() < 2 {
            return self.chatty("Not enough parameters to add group");
        }

        let alias = with_alias_prefix(args[0]);
        let members: Vec<String> = args[1..].iter().map(|u| with_alias_prefix(u)).collect();

        if let Err(e) = self
            .params
            .store
            .put_group(message.chat_id, &alias, &members)
            .await
        {
            warn!(chat_id = message.chat_id, alias = %alias, error = %e, "failed to add group");
            return self.internal_error();
        }

        Some(Response::reply(format!(
            "Group {} has been successfully added",
            escape_underscores(&alias)
        )))
    }

    /// `/add_user_to_group @alias @user`
    async fn add_user_to_group(&self, message: &Message, args: &[&str]) -> Option<Response> {
        if args.len() != 2 {
            return self.chatty("Command requires exactly two arguments - group alias and username");
        }

        let alias = with_alias_prefix(args[0]);
        let user = with_alias_prefix(args[1]);

        if let Err(e) = self
            .params
            .store
            .add_user(message.chat_id, &alias, &user)
            .await
        {
            warn!(chat_id = message.chat_id, alias = %alias, error = %e, "failed to add user to group");
            return self.internal_error();
        }

        Some(Response::reply(format!(
            "User {} has been successfully added to the group {}",
            escape_underscores(&remove_users_pings(&user)),
            escape_underscores(&alias)
        )))
    }

    /// `/delete_user_from_group @alias @user`
    async fn delete_user_from_group(&self, message: &Message, args: &[&str]) -> Option<Response> {
        if args.len() != 2 {
            return self.chatty("Command requires exactly two arguments - group alias and username");
        }

        let alias = with_alias_prefix(args[0]);
        let user = with_alias_prefix(args[1]);

        if let Err(e) = self
            .params
            .store
            .delete_user_from_group(message.chat_id, &alias, &user)
            .await
        {
            warn!(chat_id = message.chat_id, alias = %alias, error = %e, "failed to delete user from group");
            return self.internal_error();
        }

        Some(Response::reply(format!(
            "User {} has been successfully deleted from group {}",
            escape_underscores(&remove_users_pings(&user)),
            escape_underscores(&alias)
        )))
    }

    /// `/delete_group @alias`
    async fn delete_group(&self, message: &Message, args: &[&str]) -> Option<Response> {
        if args.len() != 1 {
            return self.chatty("Command requires exactly one argument - group alias");
        }

        let alias = with_alias_prefix(args[0]);
        if let Err(e) = self.params.store.delete_group(message.chat_id, &alias).await {
            warn!(chat_id = message.chat_id, alias = %alias, error = %e, "failed to delete group");
            return self.internal_error();
        }

        Some(Response::reply(format!(
            "Group {} has been successfully deleted",
            escape_underscores(&alias)
        )))
    }

    /// `/list_groups`, one `@alias : user1, user2` line per group.
    async fn list_groups(&self, message: &Message) -> Option<Response> {
        let groups = match self.params.store.get_groups(message.chat_id).await {
            Ok(groups) => groups,
            Err(e) => {
                warn!(chat_id = message.chat_id, error = %e, "failed to list groups");
                return self.internal_error();
            }
        };

        if groups.is_empty() {
            return Some(Response::reply("There's no groups in this chat yet"));
        }

        let lines: Vec<String> = groups
            .iter()
            .map(|(alias, members)| {
                format!(
                    "{} : {}",
                    escape_underscores(alias),
                    remove_users_pings(&escape_underscores(&members.join(", ")))
                )
            })
            .collect();

        Some(Response::reply(lines.join("\n")))
    }

    /// Mentions the members of every group alias found in the text.
    async fn handle_trigger(&self, message: &Message) -> Option<Response> {
        let aliases = unique(find_aliases(&message.text));
        if aliases.is_empty() {
            return None;
        }

        if let Some(source) = &self.params.chat_members {
            if aliases.iter().any(|a| a == ALL_ALIAS) {
                return self.mention_everyone(source.as_ref(), message).await;
            }
        }

        let members = match self
            .params
            .store
            .find_aliases(message.chat_id, &aliases)
            .await
        {
            Ok(members) => members,
            Err(e) => {
                warn!(chat_id = message.chat_id, error = %e, "failed to look up alias trigger");
                return None;
            }
        };

        if members.is_empty() {
            return None;
        }

        let mentions: Vec<String> = members.iter().map(|m| escape_underscores(m)).collect();
        Some(Response::text(mentions.join(" ")))
    }

    async fn mention_everyone(&self, source: &dyn ChatMembers, message: &Message) -> Option<Response> {
        let users = match source.members(message.chat_id).await {
            Ok(users) => users,
            Err(e) => {
                warn!(chat_id = message.chat_id, error = %e, "failed to get chat members for @all");
                return None;
            }
        };

        let mentions: Vec<String> = users
            .iter()
            .filter(|u| !u.is_bot)
            .filter_map(|u| u.username.as_deref())
            .map(|name| escape_underscores(&with_alias_prefix(name)))
            .collect();

        if mentions.is_empty() {
            return None;
        }
        Some(Response::text(mentions.join(" ")))
    }
}

#[async_trait]
impl Handler for GroupBot {
    /// Handles the commands listed in the help and group alias mentions. Only group chats are
    /// served.
    async fn on_message(&self, message: &Message) -> Option<Response> {
        if message.chat_type != ChatType::Group {
            return None;
        }

        if message.added_bot_to_chat {
            if let Err(e) = self.params.store.add_chat(message.chat_id).await {
                warn!(chat_id = message.chat_id, error = %e, "failed to add chat to store");
            }
            return None;
        }

        let tokens: Vec<&str> = message.text.split_whitespace().collect();
        let Some((first, args)) = tokens.split_first() else {
            return None;
        };

        // Commands may come as /cmd@botname.
        let command = first.split(ALIAS_PREFIX).next().unwrap_or_default();
        let admin = message.from_admin();

        match command {
            "/add_group" if admin => self.add_group(message, args).await,
            "/add_user_to_group" if admin => self.add_user_to_group(message, args).await,
            "/delete_user_from_group" if admin => self.delete_user_from_group(message, args).await,
            "/delete_group" if admin => self.delete_group(message, args).await,
            "/add_group" | "/add_user_to_group" | "/delete_user_from_group" | "/delete_group" => {
                self.illegal_access()
            }
            "/list_groups" => self.list_groups(message).await,
            _ => self.handle_trigger(message).await,
        }
    }

    fn help(&self) -> String {
        HELP.to_string()
    }
}
