//! エンタイトルメント（プラン）とアカウント識別
//!
//! 認証・課金は外部コラボレータ。core はここで定義する値だけを受け取り、
//! どれかが欠けていれば「ローカルのみ・無料プラン」へフォールバックする。

use serde::{Deserialize, Serialize};

/// プラン種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
}

/// 認証済みユーザーの不透明な識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(s: impl Into<String>) -> Self {
        UserId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// セッションに紐づくアカウント状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub user_id: Option<UserId>,
    pub tier: Tier,
    /// リモートストアのエンドポイント（Pro かつ認証済みのときのみ使う）
    pub remote_endpoint: Option<String>,
}

impl Account {
    /// 未認証・無料プランのアカウント
    pub fn unauthenticated() -> Self {
        Account {
            user_id: None,
            tier: Tier::Free,
            remote_endpoint: None,
        }
    }

    pub fn is_pro(&self) -> bool {
        self.tier == Tier::Pro
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// リモートストア選択の前提（認証済み ∧ Pro）。接続可否は選択時に別途確認する。
    pub fn remote_eligible(&self) -> bool {
        self.is_authenticated() && self.is_pro()
    }
}
