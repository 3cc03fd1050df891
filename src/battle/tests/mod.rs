pub mod common;

#[cfg(test)]
mod test_turn_order;



#[cfg(test)]
mod test_move_use;
