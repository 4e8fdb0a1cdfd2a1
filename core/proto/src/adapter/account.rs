//! アカウント設定の読み込み（account.json）
//!
//! 認証・エンタイトルメントの外部コラボレータとの境界。ファイルが
//! 無い・壊れている場合は「未認証・無料プラン」へフォールバックし、
//! エラーにしない。

use crate::domain::{Account, Tier, UserId};
use common::domain::Dirs;
use common::ports::outbound::FileSystem;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct AccountFile {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    pro: bool,
    #[serde(default)]
    remote_endpoint: Option<String>,
}

/// account.json からアカウント状態を読む。欠損・破損は unauthenticated。
pub fn load_account(fs: &Arc<dyn FileSystem>, dirs: &Dirs) -> Account {
    let path = dirs.account_path();
    if !fs.exists(&path) {
        return Account::unauthenticated();
    }
    let parsed: Option<AccountFile> = fs
        .read_to_string(&path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok());
    match parsed {
        Some(file) => Account {
            user_id: file.user_id.filter(|s| !s.is_empty()).map(UserId::new),
            tier: if file.pro { Tier::Pro } else { Tier::Free },
            remote_endpoint: file.remote_endpoint.filter(|s| !s.is_empty()),
        },
        None => Account::unauthenticated(),
    }
}
