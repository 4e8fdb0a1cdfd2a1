//! 配線: 標準アダプタで UseCase を組み立てる

use std::sync::Arc;

use common::adapter::{FileJsonLog, StdClock, StdEnvResolver, StdFileSystem};
use common::error::Error;
use common::ports::outbound::{Clock, EnvResolver, FileSystem, IdGenerator, Log};
use common::run_id::StdIdGenerator;

use crate::adapter::{
    load_account, select_store, FileFlagStore, FileRunStore, HttpRemoteConnector,
};
use crate::domain::Account;
use crate::ports::outbound::{FlagStore, RunStore};
use crate::usecase::{InsightUseCase, LifecycleUseCase, MigrationUseCase};

const LOG_FILENAME: &str = "proto.jsonl";

/// 組み立て済みアプリケーション。Runner（main 層）が保持する。
pub struct App {
    pub lifecycle: LifecycleUseCase,
    pub insights: InsightUseCase,
    pub logger: Arc<dyn Log>,
    pub account: Account,
    /// reset --wipe 用。選択結果に関わらずローカル実体を握っておく
    pub local: Arc<dyn RunStore>,
}

/// ストア選択と一度きりの移行を含めて App を組み立てる。
pub fn wire_proto() -> Result<App, Error> {
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let clock: Arc<dyn Clock> = Arc::new(StdClock);
    let id_gen: Arc<dyn IdGenerator> = Arc::new(StdIdGenerator::new(Arc::clone(&clock)));
    let dirs = StdEnvResolver.resolve_dirs()?;
    let logger: Arc<dyn Log> =
        Arc::new(FileJsonLog::new(Arc::clone(&fs), dirs.logs_dir().join(LOG_FILENAME)));

    let account = load_account(&fs, &dirs);
    let runs_dir = dirs.runs_dir();
    let flags: Arc<dyn FlagStore> = Arc::new(FileFlagStore::new(Arc::clone(&fs), &runs_dir));
    let local: Arc<dyn RunStore> = Arc::new(FileRunStore::new(
        Arc::clone(&fs),
        Arc::clone(&logger),
        &runs_dir,
    ));

    let connector = HttpRemoteConnector::new(account.remote_endpoint.clone());
    let selection = select_store(&account, Arc::clone(&local), &connector, Arc::clone(&logger));

    // リモートが選ばれた初回のみローカル履歴を移行する。
    // 失敗しても起動は続行する（移行側で warn ログ済み、次回セッションで再試行）
    if let (Some(api), Some(user)) = (selection.remote.as_ref(), account.user_id.as_ref()) {
        let migration =
            MigrationUseCase::new(Arc::clone(&local), Arc::clone(&flags), Arc::clone(&logger));
        let _ = migration.migrate_if_needed(api, user);
    }

    selection.store.hydrate()?;

    let lifecycle = LifecycleUseCase::new(
        Arc::clone(&selection.store),
        flags,
        clock,
        id_gen,
        Arc::clone(&logger),
        account.clone(),
    );
    let insights = InsightUseCase::new(Arc::clone(&selection.store), account.clone());
    Ok(App {
        lifecycle,
        insights,
        logger,
        account,
        local,
    })
}
