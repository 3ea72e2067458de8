pub(crate) mod math;

pub(crate) use math::BUILTINS;
