pub mod error;
pub mod graphql;
pub mod state;

#[macro_export]
macro_rules! repository_from_context {
    ($repo:ty) => {
        impl $crate::graphql::FromContext for $repo {
            fn from_context(ctx: &async_graphql::Context<'_>) -> async_graphql::Result<Self> {
                let pool = ctx.data::<moviedb_dal::Pool>()?;
                std::result::Result::Ok(<$repo>::new(pool.clone()))
            }
        }
    };
}
