//! Integration tests for the process-wide resolver.
//!
//! These go through the public entry points (`get_resolver`, the binder and
//! scoped cache guards, the default search path accessors) the way client
//! code does.

mod common;

use std::sync::{Arc, Mutex};

use arkit_core::{
    DefaultResolver, DefaultResolverContext, ResolvedPath, ResolverChanged, ResolverContext,
    ResolverContextBinder, ResolverScopedCache, get_resolver, notice_bus,
};
use arkit_core::{NoticeBus, ResolverDescriptor, get_available_resolvers};
use common::{AssetTree, SearchPathGuard, lock_globals};

#[test]
fn builtin_resolver_is_available() {
    let available = get_available_resolvers();
    assert!(
        available
            .iter()
            .any(|d: &ResolverDescriptor| d.type_name == "DefaultResolver"),
        "DefaultResolver should be registered, got {available:?}"
    );
}

#[test]
fn search_relative_asset_found_via_default_search_path() {
    let _lock = lock_globals();
    let tree = AssetTree::new();
    let file = tree.touch("library/props/arkit_it_chair.usd");
    let resolver = get_resolver();

    let _paths = SearchPathGuard::set::<String>(&[]);
    assert!(resolver.resolve("props/arkit_it_chair.usd").is_empty());

    let _paths = SearchPathGuard::set(&[tree.path("library")]);
    assert_eq!(
        resolver.resolve("props/arkit_it_chair.usd"),
        ResolvedPath::new(&file)
    );
}

#[test]
fn binder_nesting_restores_previous_context() {
    let tree = AssetTree::new();
    let outer_file = tree.touch("outer/arkit_it_nested.usd");
    let inner_file = tree.touch("inner/arkit_it_nested.usd");
    let resolver = get_resolver();

    let outer: ResolverContext = DefaultResolverContext::new([tree.path("outer")]).into();
    let inner: ResolverContext = DefaultResolverContext::new([tree.path("inner")]).into();

    let _outer = ResolverContextBinder::new(outer.clone());
    assert_eq!(resolver.resolve("arkit_it_nested.usd"), ResolvedPath::new(&outer_file));
    {
        let _inner = ResolverContextBinder::new(inner.clone());
        assert_eq!(resolver.current_context(), inner);
        assert_eq!(resolver.resolve("arkit_it_nested.usd"), ResolvedPath::new(&inner_file));
    }
    assert_eq!(resolver.current_context(), outer);
    assert_eq!(resolver.resolve("arkit_it_nested.usd"), ResolvedPath::new(&outer_file));
}

#[test]
fn identifiers_for_existing_and_new_assets() {
    let tree = AssetTree::new();
    let anchor = ResolvedPath::new(tree.touch("shot/Shot.usd"));
    let resolver = get_resolver();

    assert_eq!(
        resolver.create_identifier("./layout/Layout.usd", Some(&anchor)),
        tree.path("shot/layout/Layout.usd")
    );
    assert_eq!(
        resolver.create_identifier("assets/Chair.usd", Some(&anchor)),
        "assets/Chair.usd"
    );
    let chair = tree.touch("shot/assets/Chair.usd");
    assert_eq!(resolver.create_identifier("assets/Chair.usd", Some(&anchor)), chair);

    let new_id = resolver.create_identifier_for_new_asset("out/Render.usd", Some(&anchor));
    assert_eq!(new_id, tree.path("shot/out/Render.usd"));
    assert_eq!(
        resolver.resolve_for_new_asset(&new_id),
        ResolvedPath::new(tree.path("shot/out/Render.usd"))
    );
    assert!(resolver.resolve(&new_id).is_empty());
}

#[test]
fn scoped_cache_hides_deletion_until_scope_ends() {
    let tree = AssetTree::new();
    let file = tree.touch("cached/arkit_it_cached.usd");
    let resolver = get_resolver();
    let ctx: ResolverContext = DefaultResolverContext::new([tree.path("cached")]).into();
    let _binder = ResolverContextBinder::new(ctx);

    {
        let _cache = ResolverScopedCache::new();
        assert_eq!(resolver.resolve("arkit_it_cached.usd"), ResolvedPath::new(&file));
        tree.remove("cached/arkit_it_cached.usd");
        assert_eq!(resolver.resolve("arkit_it_cached.usd"), ResolvedPath::new(&file));
    }
    assert!(resolver.resolve("arkit_it_cached.usd").is_empty());
}

#[test]
fn default_search_path_change_notifies_once() {
    let _lock = lock_globals();
    let tree = AssetTree::new();
    let seen = Arc::new(Mutex::new(Vec::<ResolverChanged>::new()));
    let subscription = {
        let seen = Arc::clone(&seen);
        notice_bus().subscribe(Arc::new(move |notice: &ResolverChanged| {
            seen.lock().unwrap().push(notice.clone());
        }))
    };

    let dirs = [tree.path("a"), tree.path("b")];
    let _paths = SearchPathGuard::set(&dirs);
    assert!(!DefaultResolver::set_default_search_path(&dirs));
    assert_eq!(DefaultResolver::default_search_path(), dirs);

    notice_bus().unsubscribe(subscription);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let ctx: ResolverContext = DefaultResolverContext::default().into();
    assert!(seen[0].affects_context(&ctx));
}

#[test]
fn context_from_string_round_trips_display() {
    let tree = AssetTree::new();
    let resolver = get_resolver();
    let list = arkit_core::paths::join_path_list(&[tree.path("x"), tree.path("y")]);
    let ctx = resolver.create_context_from_string(&list).unwrap();
    let default_ctx = ctx.get::<DefaultResolverContext>().unwrap();
    assert_eq!(default_ctx.search_path(), [tree.path("x"), tree.path("y")]);
    assert!(default_ctx.to_string().starts_with("Search path: ["));
}
