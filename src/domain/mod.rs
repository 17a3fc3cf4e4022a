pub mod city;
pub mod collision;
pub mod enemies;
pub mod player;
pub mod weapons;
