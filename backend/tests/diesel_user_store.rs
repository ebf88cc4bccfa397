//! Integration tests for `DieselUserStore` against embedded PostgreSQL.
//!
//! Every test gets a fresh database cloned from the migrated template. Set
//! `SKIP_TEST_CLUSTER=1` to skip the suite where the cluster cannot start.

use backend::domain::ports::{ReferenceItem, UserStore};
use backend::domain::{NameRules, User, UserId, UserName};
use backend::outbound::persistence::{DbPool, DieselUserStore, PoolConfig};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use postgres::{Client, NoTls};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::{
    format_postgres_error, handle_cluster_setup_failure, provision_template_database,
    shared_cluster_handle,
};

struct TestContext {
    runtime: Runtime,
    store: DieselUserStore,
    database_url: String,
    _database: TemporaryDatabase,
}

impl TestContext {
    fn insert(&self, name: &str) -> User {
        self.runtime
            .block_on(self.store.insert(&name_of(name)))
            .expect("insert succeeds")
    }

    fn load(&self, id: UserId) -> Option<User> {
        self.runtime
            .block_on(self.store.load(id))
            .expect("load succeeds")
    }

    fn raw_names(&self) -> Vec<(i32, String)> {
        let mut client = Client::connect(&self.database_url, NoTls)
            .unwrap_or_else(|err| panic!("connect: {}", format_postgres_error(&err)));
        client
            .query(
                "SELECT id_user, nom FROM testmoussia_user ORDER BY id_user",
                &[],
            )
            .unwrap_or_else(|err| panic!("select: {}", format_postgres_error(&err)))
            .iter()
            .map(|row| (row.get(0), row.get(1)))
            .collect()
    }
}

fn name_of(raw: &str) -> UserName {
    NameRules::default().check(raw).expect("fixture name is valid")
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle().map_err(|err| err.to_string())?;
    let temp_db = provision_template_database(cluster).map_err(|err| err.to_string())?;
    let database_url = temp_db.url().to_string();

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        store: DieselUserStore::new(pool),
        database_url,
        _database: temp_db,
    })
}

#[fixture]
fn store_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn insert_assigns_key_and_load_returns_row(store_context: Option<TestContext>) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: insert_assigns_key_and_load_returns_row skipped");
        return;
    };

    let created = ctx.insert("Nom1");
    let loaded = ctx.load(created.id()).expect("row exists");

    assert_eq!(loaded, created);
    assert_eq!(loaded.name().as_ref(), "Nom1");
    assert_eq!(ctx.raw_names(), vec![(created.id().get(), "Nom1".to_owned())]);
}

#[rstest]
fn generated_keys_are_distinct(store_context: Option<TestContext>) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: generated_keys_are_distinct skipped");
        return;
    };

    let first = ctx.insert("Same");
    let second = ctx.insert("Same");

    assert_ne!(first.id(), second.id());
}

#[rstest]
fn store_overwrites_the_name(store_context: Option<TestContext>) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: store_overwrites_the_name skipped");
        return;
    };

    let created = ctx.insert("Nom1");
    let renamed = User::new(created.id(), name_of("Nom2"));
    ctx.runtime
        .block_on(ctx.store.store(&renamed))
        .expect("update succeeds");

    assert_eq!(ctx.load(created.id()), Some(renamed));
}

#[rstest]
fn store_and_delete_of_missing_rows_are_no_ops(store_context: Option<TestContext>) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: store_and_delete_of_missing_rows_are_no_ops skipped");
        return;
    };

    let missing = UserId::new(9_999).expect("positive id");
    ctx.runtime
        .block_on(ctx.store.store(&User::new(missing, name_of("Ghost"))))
        .expect("update of missing row is not an error");
    ctx.runtime
        .block_on(ctx.store.delete(missing))
        .expect("delete of missing row is not an error");

    assert!(ctx.load(missing).is_none());
    assert!(ctx.raw_names().is_empty());
}

#[rstest]
fn delete_removes_the_row(store_context: Option<TestContext>) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: delete_removes_the_row skipped");
        return;
    };

    let created = ctx.insert("Nom1");
    ctx.runtime
        .block_on(ctx.store.delete(created.id()))
        .expect("delete succeeds");

    assert!(ctx.load(created.id()).is_none());
}

#[rstest]
fn listings_reflect_creates_and_deletes(store_context: Option<TestContext>) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: listings_reflect_creates_and_deletes skipped");
        return;
    };

    let created: Vec<User> = ["Ana", "Bo", "Cy", "Di"]
        .into_iter()
        .map(|name| ctx.insert(name))
        .collect();
    for user in &created[..2] {
        ctx.runtime
            .block_on(ctx.store.delete(user.id()))
            .expect("delete succeeds");
    }

    let mut users = ctx
        .runtime
        .block_on(ctx.store.list_all())
        .expect("list succeeds");
    users.sort_by_key(User::id);
    assert_eq!(users, created[2..].to_vec());

    let mut ids = ctx
        .runtime
        .block_on(ctx.store.list_all_ids())
        .expect("id list succeeds");
    ids.sort();
    assert_eq!(ids, created[2..].iter().map(User::id).collect::<Vec<_>>());

    let mut reference = ctx
        .runtime
        .block_on(ctx.store.list_all_as_reference())
        .expect("reference list succeeds");
    reference.sort_by_key(|item| item.id);
    assert_eq!(
        reference,
        created[2..]
            .iter()
            .cloned()
            .map(ReferenceItem::from)
            .collect::<Vec<_>>()
    );
}
