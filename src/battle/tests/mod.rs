pub(crate) mod common;

#[cfg(test)]
mod test_battle_start;

#[cfg(test)]
mod test_determinism;


#[cfg(test)]
mod test_fainting;




#[cfg(test)]
mod test_data_lookup;
