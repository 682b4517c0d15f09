mod common;

use std::sync::Arc;

use anyhow::Result;

use qa_console::auth::AuthService;
use qa_console::middleware::{Navigator, LOGIN_PATH};
use qa_console::router::{RouteTable, Router, HOME_PATH};
use qa_console::session::{SessionGate, TokenStore};

const SUFFIX: &str = "AI问答平台管理后台";

struct Console {
    store: TokenStore,
    gate: SessionGate,
    router: Router,
    auth: AuthService,
}

async fn console(server: &common::TestServer) -> Console {
    let store = TokenStore::in_memory();
    let gate = SessionGate::new(store.clone());
    let router = Router::new(RouteTable::console(), gate.clone(), SUFFIX);
    let client = server.client_with_navigator(&store, Arc::new(router.clone()) as Arc<dyn Navigator>);
    Console {
        store,
        gate,
        router,
        auth: AuthService::new(client),
    }
}

#[tokio::test]
async fn non_admin_is_sent_home_from_admin_routes() -> Result<()> {
    let server = common::ensure_server().await?;
    let c = console(&server).await;

    let user = c.auth.login("alice", "secret").await?;
    assert_eq!(user.role, "user");
    assert_eq!(c.store.get().as_deref(), Some("token-alice"));
    assert_eq!(c.store.get_user(), Some(user));
    assert!(c.gate.is_logged_in());
    assert!(!c.gate.is_admin());

    let nav = c.router.navigate("/admin/users")?;
    assert_eq!(nav.redirects.first(), Some(&("/admin/users", HOME_PATH)));
    assert_eq!(nav.location, "/dashboard");
    Ok(())
}

#[tokio::test]
async fn admin_reaches_admin_routes_and_title_updates() -> Result<()> {
    let server = common::ensure_server().await?;
    let c = console(&server).await;

    c.auth.login("root", "secret").await?;
    assert!(c.gate.is_admin());

    let nav = c.router.navigate("/admin/users")?;
    assert!(!nav.was_redirected());
    assert_eq!(nav.location, "/admin/users");
    assert_eq!(c.router.title(), Some(format!("用户管理 - {}", SUFFIX)));
    Ok(())
}

#[tokio::test]
async fn login_page_is_public_until_signed_in() -> Result<()> {
    let server = common::ensure_server().await?;
    let c = console(&server).await;

    assert_eq!(c.router.navigate(LOGIN_PATH)?.location, LOGIN_PATH);
    assert_eq!(c.router.navigate("/settings")?.location, LOGIN_PATH);

    c.auth.login("alice", "secret").await?;
    let nav = c.router.navigate(LOGIN_PATH)?;
    assert_eq!(nav.redirects[0], (LOGIN_PATH, HOME_PATH));
    assert_eq!(nav.location, "/dashboard");
    Ok(())
}

#[tokio::test]
async fn rejected_session_returns_to_login() -> Result<()> {
    let server = common::ensure_server().await?;
    let c = console(&server).await;

    c.auth.login("alice", "secret").await?;
    c.router.navigate("/questions")?;
    assert_eq!(c.router.location(), Some("/questions"));

    // token revoked server side
    c.auth.api().logout().await?;
    assert!(c.auth.verify().await.is_err());

    assert!(!c.gate.is_logged_in());
    assert_eq!(c.router.location(), Some(LOGIN_PATH));
    assert_eq!(c.router.title(), Some(format!("登录 - {}", SUFFIX)));
    Ok(())
}

#[tokio::test]
async fn bad_credentials_leave_no_session() -> Result<()> {
    let server = common::ensure_server().await?;
    let c = console(&server).await;

    let err = c.auth.login("alice", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "用户名或密码错误");
    assert!(!c.gate.is_logged_in());
    assert_eq!(c.router.location(), None);
    Ok(())
}

#[tokio::test]
async fn logout_clears_session_and_notifies_subscribers() -> Result<()> {
    let server = common::ensure_server().await?;
    let c = console(&server).await;
    let mut admin = c.gate.watch_admin();
    assert!(!admin.current());

    c.auth.login("root", "secret").await?;
    assert_eq!(admin.changed().await, Some(true));

    c.auth.logout().await;
    assert_eq!(admin.changed().await, Some(false));
    assert_eq!(c.store.get(), None);
    assert_eq!(server.state.count("POST /auth/logout"), 1);
    Ok(())
}
