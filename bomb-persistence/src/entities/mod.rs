pub mod games;

pub mod prelude {
    pub use super::games::Entity as Games;
}
